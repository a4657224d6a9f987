//! Signing-attempt rate limiting
//!
//! Fixed-window counter keyed by user identity. This blunts scripted
//! signature submission from a single identity; it is not a defense
//! against distributed abuse.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::error::PortalError;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    attempts: u32,
}

pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count an attempt for `key`, denying once the cap is reached.
    /// Denied attempts do not advance the counter.
    pub fn check(&self, key: &str) -> Result<(), PortalError> {
        self.check_at(key, Utc::now())
    }

    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> Result<(), PortalError> {
        let mut windows = self.windows.lock().unwrap();
        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            attempts: 0,
        });

        if now - window.started_at >= self.window {
            *window = Window {
                started_at: now,
                attempts: 0,
            };
        }

        if window.attempts >= self.max_attempts {
            return Err(PortalError::RateLimited {
                reset_at: window.started_at + self.window,
            });
        }

        window.attempts += 1;
        Ok(())
    }
}
