//! Process configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `HABITS_*` environment variables, and an
//! optional configuration file, in that order of precedence.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Settings controlling the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HABITS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one the process keeps habits in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// File holding the cookie signing key shared with the auth service.
    pub session_key_file: Option<PathBuf>,
    /// Send the session cookie with the `Secure` attribute.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Generate a throwaway key when the key file cannot be read.
    #[ortho_config(default = false)]
    pub allow_ephemeral_key: bool,
    /// Identity used for requests without a session. Development only.
    pub demo_user_id: Option<String>,
    /// Create the demo user and sample habits at startup.
    #[ortho_config(default = false)]
    pub seed_demo: bool,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    pub fn session_key_file(&self) -> &Path {
        self.session_key_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SESSION_KEY_FILE))
    }

    /// Debug builds always accept an ephemeral key.
    pub fn ephemeral_key_allowed(&self) -> bool {
        cfg!(debug_assertions) || self.allow_ephemeral_key
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "HABITS_BIND_ADDR",
        "HABITS_DATABASE_URL",
        "HABITS_POOL_MAX_SIZE",
        "HABITS_SESSION_KEY_FILE",
        "HABITS_COOKIE_SECURE",
        "HABITS_ALLOW_EPHEMERAL_KEY",
        "HABITS_DEMO_USER_ID",
        "HABITS_SEED_DEMO",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("habit-tracker")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(settings.database_url, None);
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert_eq!(
            settings.session_key_file(),
            Path::new(DEFAULT_SESSION_KEY_FILE)
        );
        assert!(settings.cookie_secure);
        assert!(!settings.allow_ephemeral_key);
        assert_eq!(settings.demo_user_id, None);
        assert!(!settings.seed_demo);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("HABITS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "HABITS_DATABASE_URL",
                Some("postgres://localhost/habits".to_owned()),
            ),
            ("HABITS_POOL_MAX_SIZE", Some("4".to_owned())),
            ("HABITS_SESSION_KEY_FILE", Some("/tmp/key".to_owned())),
            ("HABITS_COOKIE_SECURE", Some("false".to_owned())),
            ("HABITS_ALLOW_EPHEMERAL_KEY", Some("true".to_owned())),
            ("HABITS_DEMO_USER_ID", Some("demo-user-id".to_owned())),
            ("HABITS_SEED_DEMO", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/habits")
        );
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.session_key_file(), Path::new("/tmp/key"));
        assert!(!settings.cookie_secure);
        assert!(settings.ephemeral_key_allowed());
        assert_eq!(settings.demo_user_id.as_deref(), Some("demo-user-id"));
        assert!(settings.seed_demo);
    }
}
