// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::AppError;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (extension optional)
    /// A missing file is allowed; defaults and `BEAVERDAM_` variables still apply
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("BEAVERDAM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace", 10)?
            .set_default("http.server_name", "BeaverDam/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("http.append_slash", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| AppError::Address(format!("{}:{}: {e}", self.server.host, self.server.port)))
    }
}

/// Pick the config path from the command line
///
/// Accepts `-c <path>`, `--config <path>`, `--config=<path>` or a bare path.
pub fn config_path_from_args<I>(args: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "-c" || arg == "--config" {
            if let Some(path) = args.next() {
                return path;
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        } else if !arg.starts_with('-') {
            return arg;
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(config_path_from_args(args(&[])), "config");
        assert_eq!(config_path_from_args(args(&["-c", "etc/app"])), "etc/app");
        assert_eq!(config_path_from_args(args(&["--config", "a.toml"])), "a.toml");
        assert_eq!(config_path_from_args(args(&["--config=b.toml"])), "b.toml");
        assert_eq!(config_path_from_args(args(&["c.toml"])), "c.toml");
        assert_eq!(config_path_from_args(args(&["-v"])), "config");
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-beaverdam-config").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert!(cfg.http.append_slash);
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert!(cfg.admin.enabled);
        assert!(cfg.admin.token.is_none());
        assert!(cfg.health.enabled);
        assert!(cfg.catalog.videos.is_empty());
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8000);
    }

    #[test]
    fn test_load_file_with_catalog() {
        let dir = std::env::temp_dir().join(format!("beaverdam-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("app.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "0.0.0.0"
port = 9100

[admin]
token = "s3cret"

[[catalog.videos]]
id = "intro"
filename = "intro.mp4"
host = "/media/"
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.admin.token.as_deref(), Some("s3cret"));
        assert_eq!(cfg.catalog.videos.len(), 1);
        assert_eq!(cfg.catalog.videos[0].url(), "/media/intro.mp4");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
