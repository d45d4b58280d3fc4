//! modsync configuration file parsing (modsync.toml)

use std::path::Path;

/// modsync project configuration
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ModsyncConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// Server-side settings
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: Option<u16>,
    /// Distribution tag published in the manifest
    pub distro_version: Option<String>,
    /// Mod ids to leave out of the published manifest
    pub excluded_mod_ids: Vec<String>,
}

/// Client-side settings
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address, e.g. "https://mods.example.com:8443"
    pub remote_server: Option<String>,
    /// Mod ids to skip even when the server lists them
    pub excluded_mod_ids: Vec<String>,
}

/// Config file name
pub const CONFIG_FILE: &str = "modsync.toml";

impl ModsyncConfig {
    /// Load config from the given directory.
    ///
    /// Returns default config if modsync.toml doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(root: &Path) -> color_eyre::Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
port = 8443
distro_version = "1.20.1-47.2.0"
excluded_mod_ids = ["privatemod"]

[client]
remote_server = "https://mods.example.com:8443"
excluded_mod_ids = ["clientskip"]
"#;

        let config: ModsyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, Some(8443));
        assert_eq!(config.server.distro_version.as_deref(), Some("1.20.1-47.2.0"));
        assert_eq!(config.server.excluded_mod_ids, ["privatemod"]);
        assert_eq!(
            config.client.remote_server.as_deref(),
            Some("https://mods.example.com:8443")
        );
        assert_eq!(config.client.excluded_mod_ids, ["clientskip"]);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: ModsyncConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, None);
        assert!(config.server.excluded_mod_ids.is_empty());
        assert_eq!(config.client.remote_server, None);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[client]
remote_server = "http://localhost:8443"
"#;

        let config: ModsyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.client.remote_server.as_deref(),
            Some("http://localhost:8443")
        );
        assert!(config.client.excluded_mod_ids.is_empty());
        assert_eq!(config.server.port, None);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ModsyncConfig::load(dir.path()).unwrap();
        assert_eq!(config.server.port, None);
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[server\nport = oops").unwrap();
        assert!(ModsyncConfig::load(dir.path()).is_err());
    }
}
