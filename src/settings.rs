use crate::storage::{Storage, StorageError};
use tracing::warn;

pub const API_KEY_KEY: &str = "chat.apiKey";
pub const MODEL_KEY: &str = "chat.model";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// API key and model, persisted next to the history.
///
/// The key is stored in plaintext; prefer `OPENAI_API_KEY` or the proxy
/// policy when that matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    pub fn load(storage: &dyn Storage) -> Self {
        Self::load_or(storage, DEFAULT_MODEL)
    }

    /// Like [`load`](Self::load) with a caller-chosen model default
    pub fn load_or(storage: &dyn Storage, default_model: &str) -> Self {
        let api_key = read(storage, API_KEY_KEY).filter(|k| !k.trim().is_empty());
        let model = read(storage, MODEL_KEY)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_model.to_string());

        Self { api_key, model }
    }

    /// Best-effort save; failures are logged
    pub fn save(&self, storage: &mut dyn Storage) {
        if let Err(e) = self.try_save(storage) {
            warn!("could not persist settings: {}", e);
        }
    }

    pub fn try_save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        if let Some(key) = &self.api_key {
            storage.set(API_KEY_KEY, key)?;
        }
        storage.set(MODEL_KEY, &self.model)
    }

    /// Key for display: first and last four characters only
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let chars: Vec<char> = key.chars().collect();
            if chars.len() <= 8 {
                "*".repeat(chars.len())
            } else {
                let head: String = chars[..4].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{}…{}", head, tail)
            }
        })
    }
}

fn read(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("could not read {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_defaults_when_absent() {
        let storage = MemoryStorage::new();
        let settings = Settings::load(&storage);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model, "gpt-4o-mini");
    }

    #[test]
    fn test_save_and_load() {
        let mut storage = MemoryStorage::new();
        let settings = Settings {
            api_key: Some("sk-test-1234567890".to_string()),
            model: "gpt-4o".to_string(),
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_try_save_reports_write_failure() {
        let mut storage = MemoryStorage::with_quota(8);
        let settings = Settings {
            api_key: Some("sk-test-1234567890".to_string()),
            ..Settings::default()
        };
        let err = settings.try_save(&mut storage).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 8, .. }));
        assert_eq!(Settings::load(&storage), Settings::default());

        // The best-effort path swallows the same failure
        settings.save(&mut storage);
    }

    #[test]
    fn test_blank_model_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        storage.set(MODEL_KEY, "  ").unwrap();
        assert_eq!(Settings::load(&storage).model, DEFAULT_MODEL);
    }

    #[test]
    fn test_masked_key() {
        let settings = Settings {
            api_key: Some("sk-abcdefghijkl".to_string()),
            model: DEFAULT_MODEL.to_string(),
        };
        assert_eq!(settings.masked_key().as_deref(), Some("sk-a…ijkl"));

        let short = Settings {
            api_key: Some("abc".to_string()),
            ..Settings::default()
        };
        assert_eq!(short.masked_key().as_deref(), Some("***"));
    }
}
