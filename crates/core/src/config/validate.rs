use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port and job limit are not 0
/// - Engine limits and intervals are not 0
/// - Offload URL is set and timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }
    if config.server.max_running_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_running_jobs cannot be 0".to_string(),
        ));
    }

    // Engine validation
    let engine = &config.engine;
    let limits = [
        ("engine.max_candidates", engine.max_candidates),
        ("engine.max_universe", engine.max_universe),
        ("engine.max_index_entries", engine.max_index_entries),
        ("engine.prune_interval", engine.prune_interval as u64),
        (
            "engine.index_checkpoint_interval",
            engine.index_checkpoint_interval as u64,
        ),
        (
            "engine.greedy_checkpoint_interval",
            engine.greedy_checkpoint_interval as u64,
        ),
    ];
    if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
        return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
    }

    // Offload validation
    if let Some(offload) = &config.offload {
        if offload.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "offload.url cannot be empty".to_string(),
            ));
        }
        if offload.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "offload.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OffloadConfig, ServerConfig};
    use crate::engine::EngineConfig;
    use std::net::IpAddr;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
                ..ServerConfig::default()
            },
            ..Config::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_running_jobs_fails() {
        let mut config = Config::default();
        config.server.max_running_jobs = 0;
        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("server.max_running_jobs"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_zero_prune_interval_fails() {
        let config = Config {
            engine: EngineConfig {
                prune_interval: 0,
                ..EngineConfig::default()
            },
            ..Config::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("engine.prune_interval"));
    }

    #[test]
    fn test_validate_empty_offload_url_fails() {
        let config = Config {
            offload: Some(OffloadConfig {
                url: "  ".to_string(),
                timeout_secs: 30,
                threshold: 10,
            }),
            ..Config::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_offload_timeout_fails() {
        let config = Config {
            offload: Some(OffloadConfig {
                url: "http://localhost:9090".to_string(),
                timeout_secs: 0,
                threshold: 10,
            }),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
