/// Player configuration
use crate::error::{PlayerError, Result};
use cadence_cms_client::ClientConfig;
use cadence_playback::{PlaybackConfig, ProbeConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

/// Filter used when neither `RUST_LOG` nor `log_filter` is set
pub const DEFAULT_LOG_FILTER: &str =
    "cadence_player=info,cadence_playback=info,cadence_cms_client=info";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_cms")]
    pub cms: CmsSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_probe")]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CmsSettings {
    #[serde(default = "default_cms_url")]
    pub url: String,

    /// JWT sent with every request, if set
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_volume")]
    pub volume: u8,

    #[serde(default)]
    pub repeat: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeSettings {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            cms: default_cms(),
            playback: default_playback(),
            probe: default_probe(),
            log_filter: None,
        }
    }
}

impl PlayerConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Without one, `cadence.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`load`](Self::load), reading variables from `env` instead of
    /// the process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // CADENCE_CMS__URL, CADENCE_PROBE__TIMEOUT_MS, ...
        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cms.url.trim().is_empty() {
            return Err(PlayerError::Config(
                "CMS URL is required (set CADENCE_CMS__URL)".to_string(),
            ));
        }

        if self.cms.timeout_secs == 0 {
            return Err(PlayerError::Config(
                "cms.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.playback.volume > 100 {
            return Err(PlayerError::Config(format!(
                "playback.volume must be between 0 and 100, got {}",
                self.playback.volume
            )));
        }

        if self.probe.max_concurrent == 0 {
            return Err(PlayerError::Config(
                "probe.max_concurrent must be at least 1".to_string(),
            ));
        }

        if self.probe.timeout_ms == 0 {
            return Err(PlayerError::Config(
                "probe.timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        let config = match &self.cms.token {
            Some(token) => ClientConfig::with_token(self.cms.url.clone(), token.clone()),
            None => ClientConfig::new(self.cms.url.clone()),
        };
        config.timeout(Duration::from_secs(self.cms.timeout_secs))
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            volume: self.playback.volume,
            repeat: self.playback.repeat,
        }
    }

    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            max_concurrent: self.probe.max_concurrent,
            timeout: Duration::from_millis(self.probe.timeout_ms),
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

// Default values
fn default_cms() -> CmsSettings {
    CmsSettings {
        url: default_cms_url(),
        token: None,
        timeout_secs: default_timeout_secs(),
    }
}

fn default_cms_url() -> String {
    "http://localhost:1337".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        volume: default_volume(),
        repeat: false,
    }
}

fn default_volume() -> u8 {
    100
}

fn default_probe() -> ProbeSettings {
    ProbeSettings {
        max_concurrent: default_max_concurrent(),
        timeout_ms: default_probe_timeout_ms(),
    }
}

fn default_max_concurrent() -> usize {
    4
}

fn default_probe_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_sources() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        // An explicit path must exist
        assert!(PlayerConfig::load_with_env(Some(&missing), env(&[])).is_err());

        let config = PlayerConfig::default();
        assert_eq!(config.cms.url, "http://localhost:1337");
        assert_eq!(config.playback.volume, 100);
        assert!(!config.playback.repeat);
        assert_eq!(config.probe.max_concurrent, 4);
        assert_eq!(config.probe.timeout_ms, 5000);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
log_filter = "cadence_playback=debug"

[cms]
url = "https://cms.example.com"
token = "jwt-abc"

[playback]
volume = 40
repeat = true
"#,
        );

        let config = PlayerConfig::load_with_env(Some(file.path()), env(&[])).unwrap();

        assert_eq!(config.cms.url, "https://cms.example.com");
        assert_eq!(config.cms.token.as_deref(), Some("jwt-abc"));
        assert_eq!(config.cms.timeout_secs, 30);
        assert_eq!(config.playback.volume, 40);
        assert!(config.playback.repeat);
        assert_eq!(config.probe.max_concurrent, 4);
        assert_eq!(config.log_filter(), "cadence_playback=debug");
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("[probe]\nmax_concurrent = 2\n");

        let config = PlayerConfig::load_with_env(
            Some(file.path()),
            env(&[
                ("CADENCE_PROBE__MAX_CONCURRENT", "8"),
                ("CADENCE_PROBE__TIMEOUT_MS", "1500"),
                ("CADENCE_CMS__URL", "http://10.0.0.5:1337"),
            ]),
        )
        .unwrap();

        assert_eq!(config.probe.max_concurrent, 8);
        assert_eq!(config.probe_config().timeout, Duration::from_millis(1500));
        assert_eq!(config.client_config().url, "http://10.0.0.5:1337");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PlayerConfig::default();
        config.cms.url = "  ".to_string();
        assert!(matches!(config.validate(), Err(PlayerError::Config(_))));

        let mut config = PlayerConfig::default();
        config.probe.max_concurrent = 0;
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::default();
        config.probe.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::default();
        config.playback.volume = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversions() {
        let mut config = PlayerConfig::default();
        config.cms.token = Some("jwt".to_string());
        config.playback.volume = 55;

        let client = config.client_config();
        assert_eq!(client.token.as_deref(), Some("jwt"));
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert_eq!(config.playback_config().volume, 55);
        assert_eq!(config.probe_config().max_concurrent, 4);
    }
}
