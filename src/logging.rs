//! Logging setup for the stage binaries

use tracing_subscriber::EnvFilter;

/// Logging configuration handed to each entry point.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub default_directive: String,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_directive: "info".to_string(),
            with_target: true,
        }
    }
}

impl LogConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_directive))
    }
}

/// Installs the fmt subscriber. A second call is a no-op.
pub fn init(config: &LogConfig) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.with_target)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LogConfig::default();
        init(&config);
        init(&config);
    }
}
