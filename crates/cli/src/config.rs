//! CLI configuration utilities

use anyhow::Result;
use smartbi_core::ClientConfig;
use std::path::Path;

/// Save client configuration as TOML
pub fn save_client_config<P: AsRef<Path>>(config: &ClientConfig, path: P) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Generate a default configuration file
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = ClientConfig::default();
    save_client_config(&config, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("smartbi.toml");

        generate_default_config(&path).unwrap();
        let loaded = ClientConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.timeout_ms, ClientConfig::default().timeout_ms);
        assert_eq!(loaded.token_key, "token");
    }
}
