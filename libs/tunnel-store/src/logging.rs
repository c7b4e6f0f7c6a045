//! Logging initialization for processes hosting the tunnel store.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::StoreConfig;

/// Install a global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Returns an error if
/// a global subscriber is already installed.
pub fn init(config: &StoreConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_fails() {
        let config = StoreConfig {
            log_level: "debug".to_string(),
            ..StoreConfig::default()
        };

        // A global subscriber is set after the first call
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
