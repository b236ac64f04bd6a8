// src/quiz/mod.rs

pub mod builder;
pub mod session;
pub mod store;

pub use builder::{ShuffleOptions, build_definition};
pub use session::{Advance, Outcome, Phase, QuizSession, SessionError};
pub use store::{SessionStore, StoredSession};
