pub mod certificate;
pub mod course;
pub mod quiz;
