//! Tracing subscriber setup.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ServiceConfig};

type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &ServiceConfig) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.log_format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

/// Initialize tracing for tests.
///
/// Output goes through the test writer so it is captured per test. Only
/// initializes once.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
