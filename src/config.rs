use crate::types::{Config, DnscopeError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Loads the TOML file when it exists, then layers environment overrides on top.
pub fn load_config(config_path: Option<&Path>) -> Result<Config, DnscopeError> {
    let mut config = match config_path {
        Some(path) if path.exists() => {
            let contents = fs::read_to_string(path)
                .map_err(|e| DnscopeError::ConfigError(format!("Failed to read config file: {}", e)))?;
            parse_config(&contents)?
        }
        _ => Config::default(),
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<Config, DnscopeError> {
    toml::from_str(contents)
        .map_err(|e| DnscopeError::ConfigError(format!("Failed to parse config file: {}", e)))
}

fn apply_env_overrides(config: &mut Config) -> Result<(), DnscopeError> {
    if let Some(workers) = env_number("DNSCOPE_WORKERS")? {
        config.probe.workers = workers;
    }
    if let Some(workers) = env_number("DNSCOPE_REVERSE_WORKERS")? {
        config.reverse.workers = Some(workers);
    }
    if let Some(attempts) = env_number("DNSCOPE_ATTEMPTS")? {
        config.reverse.attempts = attempts;
    }
    if let Ok(servers) = env::var("DNSCOPE_NAMESERVERS") {
        config.resolver.nameservers = servers
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Ok(dir) = env::var("DNSCOPE_OUTPUT_DIR") {
        config.output.directory = PathBuf::from(dir);
    }
    Ok(())
}

fn env_number<T: FromStr>(key: &str) -> Result<Option<T>, DnscopeError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DnscopeError::ConfigError(format!("{} must be a positive number, got {:?}", key, value))),
        Err(_) => Ok(None),
    }
}

pub fn validate_config(config: &Config) -> Result<(), DnscopeError> {
    if config.probe.workers == 0 {
        return Err(DnscopeError::ConfigError("Probe workers must be greater than 0".to_string()));
    }
    if config.reverse.workers == Some(0) {
        return Err(DnscopeError::ConfigError("Reverse lookup workers must be greater than 0".to_string()));
    }
    if config.reverse.attempts == 0 {
        return Err(DnscopeError::ConfigError("Reverse lookup attempts must be greater than 0".to_string()));
    }
    if !config.resolver.use_system_resolver && config.resolver.nameservers.is_empty() {
        return Err(DnscopeError::ConfigError("No nameservers configured and system resolver disabled".to_string()));
    }
    if config.resolver.timeout_secs == 0 {
        return Err(DnscopeError::ConfigError("Resolver timeout must be greater than 0".to_string()));
    }
    Ok(())
}
