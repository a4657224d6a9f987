//! Portal configuration
//!
//! Everything the NDA workflow depends on — agreement version, validity
//! window, role sets, gated phases, rate limits — is adjustable through
//! the environment without code changes.

use std::str::FromStr;

use chrono::Duration;

use dealroom_core::{AgreementConfig, Phase, Role};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// SQLite database path; in-memory stores are used when unset
    pub database_path: Option<String>,

    /// Agreement version currently in force
    pub nda_version: String,

    /// Agreement effective date, as shown in the rendered text
    pub effective_date: String,

    /// Signature validity in days
    pub validity_days: i64,

    /// Roles that bypass the NDA entirely
    pub exempt_roles: Vec<Role>,

    /// Roles whose signature state is consulted
    pub required_roles: Vec<Role>,

    /// Document phases that require a valid signature
    pub gated_phases: Vec<Phase>,

    /// Signing attempts allowed per window
    pub rate_limit_attempts: u32,

    /// Rate-limit window in seconds
    pub rate_limit_window_secs: i64,

    /// User ids granted the admin role at startup
    pub admin_users: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let agreement = AgreementConfig::default();
        Self {
            port: 3000,
            database_path: None,
            nda_version: agreement.version,
            effective_date: agreement.effective_date,
            validity_days: 730,
            exempt_roles: agreement.exempt_roles,
            required_roles: agreement.required_roles,
            gated_phases: agreement.gated_phases,
            rate_limit_attempts: 5,
            rate_limit_window_secs: 3600,
            admin_users: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            port: env_parse("DEALROOM_PORT", defaults.port),
            database_path: std::env::var("DEALROOM_DATABASE").ok().filter(|s| !s.is_empty()),
            nda_version: env_or("DEALROOM_NDA_VERSION", &defaults.nda_version),
            effective_date: env_or("DEALROOM_NDA_EFFECTIVE_DATE", &defaults.effective_date),
            validity_days: env_parse("DEALROOM_NDA_VALIDITY_DAYS", defaults.validity_days),
            exempt_roles: env_list("DEALROOM_EXEMPT_ROLES", &defaults.exempt_roles),
            required_roles: env_list("DEALROOM_REQUIRED_ROLES", &defaults.required_roles),
            gated_phases: env_list("DEALROOM_GATED_PHASES", &defaults.gated_phases),
            rate_limit_attempts: env_parse("DEALROOM_RATE_LIMIT_ATTEMPTS", defaults.rate_limit_attempts),
            rate_limit_window_secs: env_parse(
                "DEALROOM_RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window_secs,
            ),
            admin_users: std::env::var("DEALROOM_ADMIN_USERS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Agreement rules derived from this configuration
    pub fn agreement(&self) -> AgreementConfig {
        AgreementConfig {
            version: self.nda_version.clone(),
            effective_date: self.effective_date.clone(),
            validity: Duration::days(self.validity_days),
            exempt_roles: self.exempt_roles.clone(),
            required_roles: self.required_roles.clone(),
            gated_phases: self.gated_phases.clone(),
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::seconds(self.rate_limit_window_secs)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse a comma-separated list, dropping entries that fail to parse.
/// Dropped entries are logged; an unset variable keeps the default.
fn env_list<T: FromStr + Clone>(key: &str, default: &[T]) -> Vec<T> {
    let Ok(raw) = std::env::var(key) else {
        return default.to_vec();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|entry| match entry.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key = %key, entry = %entry, "Ignoring unparseable config entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rate_limit_attempts, 5);
        assert_eq!(config.rate_limit_window_secs, 3600);
        assert_eq!(config.validity_days, 730);
        assert!(config.database_path.is_none());

        let agreement = config.agreement();
        assert_eq!(agreement.validity, Duration::days(730));
        assert_eq!(agreement.exempt_roles, vec![Role::Admin]);
    }
}
