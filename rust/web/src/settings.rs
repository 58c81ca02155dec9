use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Table defaults a client can adjust through the web interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    /// Stake pre-filled in the betting controls.
    pub default_stake: u64,
    /// Chips a new session's wallet opens with.
    pub starting_chips: u64,
    /// Render cards with suit glyphs instead of ASCII letters.
    pub unicode_cards: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_stake: 10,
            starting_chips: 1000,
            unicode_cards: true,
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.default_stake == 0 {
            return Err(SettingsError::InvalidValue(
                "default_stake must be at least 1".to_string(),
            ));
        }

        if self.starting_chips == 0 {
            return Err(SettingsError::InvalidValue(
                "starting_chips must be at least 1".to_string(),
            ));
        }

        if self.default_stake > self.starting_chips {
            return Err(SettingsError::InvalidValue(
                "default_stake cannot exceed starting_chips".to_string(),
            ));
        }

        Ok(())
    }
}

/// In-memory settings store with validation.
#[derive(Debug)]
pub struct SettingsStore {
    settings: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(AppSettings::default()),
        }
    }

    pub fn with_settings(settings: AppSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings: RwLock::new(settings),
        })
    }

    pub fn get(&self) -> Result<AppSettings, SettingsError> {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SettingsError::StoragePoisoned)
    }

    pub fn update(&self, new_settings: AppSettings) -> Result<AppSettings, SettingsError> {
        new_settings.validate()?;

        let mut guard = self
            .settings
            .write()
            .map_err(|_| SettingsError::StoragePoisoned)?;
        *guard = new_settings.clone();
        Ok(new_settings)
    }

    /// Update a single named field, leaving the rest untouched.
    pub fn update_field(
        &self,
        field: &str,
        value: serde_json::Value,
    ) -> Result<AppSettings, SettingsError> {
        let mut current = self.get()?;

        match field {
            "default_stake" => {
                let stake = value.as_u64().ok_or_else(|| {
                    SettingsError::InvalidValue("default_stake must be a number".to_string())
                })?;
                current.default_stake = stake;
            }
            "starting_chips" => {
                let chips = value.as_u64().ok_or_else(|| {
                    SettingsError::InvalidValue("starting_chips must be a number".to_string())
                })?;
                current.starting_chips = chips;
            }
            "unicode_cards" => {
                let unicode = value.as_bool().ok_or_else(|| {
                    SettingsError::InvalidValue("unicode_cards must be a boolean".to_string())
                })?;
                current.unicode_cards = unicode;
            }
            _ => {
                return Err(SettingsError::InvalidValue(format!(
                    "unknown field: {}",
                    field
                )))
            }
        }

        self.update(current)
    }

    pub fn reset(&self) -> Result<AppSettings, SettingsError> {
        self.update(AppSettings::default())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Settings storage poisoned")]
    StoragePoisoned,
}

impl crate::errors::IntoErrorResponse for SettingsError {
    fn status_code(&self) -> warp::http::StatusCode {
        match self {
            SettingsError::InvalidValue(_) => warp::http::StatusCode::BAD_REQUEST,
            SettingsError::StoragePoisoned => warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SettingsError::InvalidValue(_) => "invalid_settings_value",
            SettingsError::StoragePoisoned => "settings_storage_error",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        match self {
            SettingsError::StoragePoisoned => crate::errors::ErrorSeverity::Critical,
            SettingsError::InvalidValue(_) => crate::errors::ErrorSeverity::Client,
        }
    }
}
