//! Console configuration.
//!
//! Values come from three layers: built-in defaults, an optional TOML file,
//! and CLI flags (highest precedence).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::error::{ConsoleError, Result};

/// File looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "console.toml";

/// Resolved configuration for a console session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the REST API (e.g. `http://127.0.0.1:5000`).
    pub base_url: String,
    /// URL of the realtime WebSocket endpoint.
    pub ws_url: String,
    /// Skip the realtime channel and always use REST.
    pub http_only: bool,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Cap on retained console lines; `None` keeps everything.
    pub max_lines: Option<usize>,
    pub color: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            base_url: "http://127.0.0.1:5000".to_string(),
            ws_url: "ws://127.0.0.1:5000/ws".to_string(),
            http_only: false,
            connect_timeout_ms: 3_000,
            request_timeout_ms: 10_000,
            max_lines: None,
            color: true,
        }
    }
}

impl ConsoleConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ConsoleError::Config {
            path: origin.to_string(),
            detail: e.to_string(),
        })
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Resolve the effective config for `args`.
    ///
    /// An explicit `--config` path must exist. Without one, `console.toml`
    /// in the working directory is used if present.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(&fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_args(args);
        Ok(config)
    }

    /// Overlay CLI flags.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(url) = &args.base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = &args.ws_url {
            self.ws_url = url.clone();
        }
        if args.http_only {
            self.http_only = true;
        }
        if let Some(n) = args.max_lines {
            self.max_lines = Some(n);
        }
        if args.no_color {
            self.color = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = ConsoleConfig::default();
        assert_eq!(c.base_url, "http://127.0.0.1:5000");
        assert_eq!(c.connect_timeout(), Duration::from_secs(3));
        assert_eq!(c.request_timeout(), Duration::from_secs(10));
        assert!(c.max_lines.is_none());
        assert!(c.color);
        assert!(!c.http_only);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ConsoleConfig::from_toml_str("base_url = \"http://example:8080\"\n", "inline").unwrap();
        assert_eq!(c.base_url, "http://example:8080");
        assert_eq!(c.ws_url, "ws://127.0.0.1:5000/ws");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ConsoleConfig::from_toml_str("max_lines = \"many\"", "bad.toml").unwrap_err();
        match err {
            ConsoleError::Config { path, .. } => assert_eq!(path, "bad.toml"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_lines = 500\ncolor = false\nhttp_only = true").unwrap();
        let c = ConsoleConfig::load(file.path()).unwrap();
        assert_eq!(c.max_lines, Some(500));
        assert!(!c.color);
        assert!(c.http_only);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConsoleConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConsoleError::Io(_)));
    }

    #[test]
    fn cli_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://file:1\"\nmax_lines = 10").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let args = Args::parse_from([
            "cc",
            "--config",
            &path,
            "--base-url",
            "http://cli:2/",
            "--no-color",
        ]);
        let c = ConsoleConfig::resolve(&args).unwrap();
        assert_eq!(c.base_url, "http://cli:2");
        assert_eq!(c.max_lines, Some(10));
        assert!(!c.color);
    }
}
