//! Server configuration loaded from environment variables.
//!
//! All settings have production-safe defaults. Override any variable at
//! container / process startup; no config file required.
//!
//! | Variable                   | Default   | Description                                 |
//! |----------------------------|-----------|---------------------------------------------|
//! | `RABBITHOLE_DATA_DIR`      | `./data`  | sentence / vector / projection files        |
//! | `RABBITHOLE_PORT`          | `8080`    | HTTP listen port                            |
//! | `RABBITHOLE_LOG_LEVEL`     | `info`    | tracing level (trace/debug/info/warn/error) |
//! | `RABBITHOLE_EDIT_TOKEN`    | *(unset)* | shared secret for update/reset (unset = open) |
//!
//! The embedding backend reads its own `RABBITHOLE_EMBED_*` /
//! `RABBITHOLE_ONNX_*` variables; see `rabbithole-embed`.

/// Runtime configuration for the rabbithole server process.
#[derive(Debug)]
pub struct Config {
    /// Directory holding `sentence.txt`, `vectors.json`, `projection.json`.
    pub data_dir: String,

    /// HTTP listen port.
    pub port: u16,

    /// Tracing filter string, e.g. `"rabbithole_server=debug,info"`.
    pub log_level: String,

    /// Shared secret for the authenticated operations. `None` disables auth.
    pub edit_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, applying defaults
    /// where a variable is absent or unparseable.
    pub fn from_env() -> Self {
        Self {
            data_dir: env_str("RABBITHOLE_DATA_DIR", "./data"),
            port: env_parse("RABBITHOLE_PORT", 8080),
            log_level: env_str("RABBITHOLE_LOG_LEVEL", "info"),
            edit_token: std::env::var("RABBITHOLE_EDIT_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
        }
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::from_env();
        assert!(!cfg.data_dir.is_empty());
        assert!(cfg.port > 0);
        assert!(!cfg.log_level.is_empty());
    }

    #[test]
    fn env_override_applied() {
        std::env::set_var("RABBITHOLE_PORT", "9191");
        let cfg = Config::from_env();
        assert_eq!(cfg.port, 9191);
        std::env::remove_var("RABBITHOLE_PORT");
    }

    #[test]
    fn empty_edit_token_counts_as_unset() {
        std::env::set_var("RABBITHOLE_EDIT_TOKEN", "");
        let cfg = Config::from_env();
        assert!(cfg.edit_token.is_none());
        std::env::remove_var("RABBITHOLE_EDIT_TOKEN");
    }
}
