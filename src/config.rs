use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

/// Stdout log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

/// Service configuration, from flags or environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "rsa-ops-service", version, about = "RSA encrypt/decrypt/sign over HTTP")]
pub struct ServiceConfig {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "RSA_SERVICE_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Tracing filter directive; `RUST_LOG` takes precedence when set.
    #[arg(long = "log-level", env = "RSA_SERVICE_LOG", default_value = "info")]
    pub log_level: String,

    /// Stdout log format.
    #[arg(long = "log-format", env = "RSA_SERVICE_LOG_FORMAT", value_enum, default_value = "full")]
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: ([127, 0, 0, 1], 5000).into(),
            log_level: "info".to_string(),
            log_format: LogFormat::Full,
        }
    }
}
