// src/config.rs

use std::{env, net::SocketAddr};

use dotenvy::dotenv;

use crate::{error::AppError, quiz::ShuffleOptions};

/// Pass threshold used when the backend does not supply one.
pub const DEFAULT_MIN_SCORE_PERCENT: u32 = 70;

/// Minimum playback distance (seconds) between two progress saves of one lesson.
pub const PROGRESS_SAVE_INTERVAL_SECS: u64 = 10;

/// Watched percentage at which a lesson counts as completed.
pub const LESSON_COMPLETE_PERCENT: f64 = 90.0;

/// Quiz sessions untouched for this long are dropped from memory.
pub const SESSION_IDLE_TTL_SECS: u64 = 2 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub jwt_secret: String,
    pub public_base_url: String,
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    pub shuffle_questions: bool,
    pub shuffle_choices: bool,
    pub backend_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let backend_url = required("BACKEND_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is not a socket address: {}", e)))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let backend_timeout_secs = env::var("BACKEND_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(10);

        Ok(Self {
            backend_url,
            jwt_secret,
            public_base_url,
            bind_addr,
            rust_log,
            shuffle_questions: flag("SHUFFLE_QUESTIONS", true),
            shuffle_choices: flag("SHUFFLE_CHOICES", true),
            backend_timeout_secs,
        })
    }

    pub fn shuffle_options(&self) -> ShuffleOptions {
        ShuffleOptions {
            questions: self.shuffle_questions,
            choices: self.shuffle_choices,
        }
    }
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Config(format!("{} must be set", name)))
}

fn flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
