use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

pub trait ConfigSerializer<TConfig> {
    fn serialize(&self, config: &TConfig) -> Result<String, String>;
    fn deserialize(&self, content: &str) -> Result<TConfig, String>;
}

pub trait ConfigContentProvider {
    /// `Ok(None)` means there is nothing stored yet.
    fn read_content(&self) -> Result<Option<String>, String>;
}

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

#[derive(Default)]
pub struct YamlConfigSerializer;

impl<TConfig> ConfigSerializer<TConfig> for YamlConfigSerializer
where
    TConfig: for<'de> Deserialize<'de> + Serialize,
{
    fn serialize(&self, config: &TConfig) -> Result<String, String> {
        serde_yaml_ng::to_string(config).map_err(|e| format!("Failed to serialize config: {}", e))
    }

    fn deserialize(&self, content: &str) -> Result<TConfig, String> {
        serde_yaml_ng::from_str(content).map_err(|e| format!("Failed to deserialize config: {}", e))
    }
}

pub struct FileContentConfigProvider {
    path: PathBuf,
}

impl FileContentConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigContentProvider for FileContentConfigProvider {
    fn read_content(&self) -> Result<Option<String>, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("Failed to read config file {}: {}", self.path.display(), err)),
        }
    }
}

/// Loads a validated configuration. A missing source yields
/// `TConfig::default()`; anything present must parse and validate.
pub struct ConfigManager<TProvider, TSerializer = YamlConfigSerializer> {
    provider: TProvider,
    serializer: TSerializer,
}

impl ConfigManager<FileContentConfigProvider, YamlConfigSerializer> {
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileContentConfigProvider::new(path), YamlConfigSerializer)
    }
}

impl<TProvider, TSerializer> ConfigManager<TProvider, TSerializer>
where
    TProvider: ConfigContentProvider,
{
    pub fn new(provider: TProvider, serializer: TSerializer) -> Self {
        Self { provider, serializer }
    }

    pub fn load<TConfig>(&self) -> Result<TConfig, String>
    where
        TConfig: Validate + Default,
        TSerializer: ConfigSerializer<TConfig>,
    {
        let Some(content) = self.provider.read_content()? else {
            return Ok(TConfig::default());
        };
        let config = self.serializer.deserialize(&content)?;
        config.validate().map_err(|e| format!("Config validation error: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TickConfig {
        tick_interval_ms: u32,
    }

    impl Default for TickConfig {
        fn default() -> Self {
            Self { tick_interval_ms: 75 }
        }
    }

    impl Validate for TickConfig {
        fn validate(&self) -> Result<(), String> {
            if self.tick_interval_ms == 0 {
                return Err("tick_interval_ms must be greater than 0".to_string());
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryProvider {
        content: Option<String>,
    }

    impl MemoryProvider {
        fn with_content(content: &str) -> Self {
            Self {
                content: Some(content.to_string()),
            }
        }
    }

    impl ConfigContentProvider for MemoryProvider {
        fn read_content(&self) -> Result<Option<String>, String> {
            Ok(self.content.clone())
        }
    }

    fn get_temp_file_path() -> PathBuf {
        let random_number: u32 = rand::random();
        std::env::temp_dir().join(format!("temp_snek_config_{}.yaml", random_number))
    }

    #[test]
    fn test_missing_content_returns_default() {
        let manager = ConfigManager::new(MemoryProvider::default(), YamlConfigSerializer);
        let loaded: TickConfig = manager.load().unwrap();
        assert_eq!(loaded, TickConfig::default());
    }

    #[test]
    fn test_load_through_file() {
        let path = get_temp_file_path();
        let content = YamlConfigSerializer.serialize(&TickConfig { tick_interval_ms: 120 }).unwrap();
        std::fs::write(&path, content).unwrap();

        let loaded: TickConfig = ConfigManager::from_yaml_file(&path).load().unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, TickConfig { tick_interval_ms: 120 });
    }

    #[test]
    fn test_missing_file_returns_default() {
        let loaded: TickConfig = ConfigManager::from_yaml_file(get_temp_file_path()).load().unwrap();
        assert_eq!(loaded, TickConfig::default());
    }

    #[test]
    fn test_invalid_config_cant_be_read() {
        let manager = ConfigManager::new(MemoryProvider::with_content("tick_interval_ms: 0\n"), YamlConfigSerializer);

        let result: Result<TickConfig, String> = manager.load();

        assert!(result.unwrap_err().contains("validation"));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let manager = ConfigManager::new(MemoryProvider::with_content("tick_interval_ms: ["), YamlConfigSerializer);

        let result: Result<TickConfig, String> = manager.load();

        assert!(result.is_err());
    }
}
