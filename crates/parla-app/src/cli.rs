//! CLI argument definitions for the Parla server.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Parla - voice chat and real-time translation relay.
#[derive(Parser, Debug)]
#[command(name = "parla", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to.
    #[arg(long = "host")]
    pub host: Option<String>,

    /// HTTP server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Completion model name.
    #[arg(long = "model")]
    pub model: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PARLA_CONFIG env var > ~/.parla/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PARLA_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the HTTP server port.
    ///
    /// Priority: --port flag > PARLA_PORT > PORT > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        for var in ["PARLA_PORT", "PORT"] {
            if let Some(p) = std::env::var(var).ok().and_then(|v| v.parse::<u16>().ok()) {
                return p;
            }
        }
        config_port
    }

    /// Resolve the bind address. Priority: --host flag > config file value.
    pub fn resolve_host(&self, config_host: &str) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| config_host.to_string())
    }

    /// Resolve the completion model.
    ///
    /// Priority: --model flag > OPENAI_MODEL env var > config file value.
    pub fn resolve_model(&self, config_model: &str) -> String {
        if let Some(ref m) = self.model {
            return m.clone();
        }
        match std::env::var("OPENAI_MODEL") {
            Ok(m) if !m.trim().is_empty() => m,
            _ => config_model.to_string(),
        }
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    /// `RUST_LOG` still wins over both when set; see `main`.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".parla").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".parla").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("parla").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_parse() {
        let args = parse(&[
            "-c",
            "/tmp/parla.toml",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
            "-l",
            "debug",
            "--model",
            "gpt-4o-mini",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/parla.toml")));
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&["--port", "4000", "--host", "0.0.0.0", "--model", "m", "-l", "warn"]);
        assert_eq!(args.resolve_port(3000), 4000);
        assert_eq!(args.resolve_host("127.0.0.1"), "0.0.0.0");
        assert_eq!(args.resolve_model("gpt-3.5-turbo"), "m");
        assert_eq!(args.resolve_log_level("info"), "warn");
    }

    #[test]
    fn test_config_values_without_flags() {
        let args = parse(&[]);
        assert_eq!(args.resolve_host("127.0.0.1"), "127.0.0.1");
        assert_eq!(args.resolve_log_level("info"), "info");
    }

    #[test]
    fn test_explicit_config_path() {
        let args = parse(&["--config", "custom.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("custom.toml"));
    }
}
