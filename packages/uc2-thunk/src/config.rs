//! Thunk configuration.
//!
//! Configurations are JSON objects; every field is optional:
//! ```json
//! {"language_buffer_size": 43, "allocation_retries": 0, "notify_tpl": "callback"}
//! ```

use serde::{Deserialize, Serialize};

use efi_collation::RFC_4646_ENTRY_SIZE;
use efi_protocol_db::Tpl;

use crate::ConfigError;

/// Smallest language buffer that holds a two-letter tag and its terminator.
pub const MIN_LANGUAGE_BUFFER_SIZE: usize = 3;

/// Upper bound on [`ThunkConfig::allocation_retries`].
pub const MAX_ALLOCATION_RETRIES: u32 = 8;

/// Tunables for the thunk driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThunkConfig {
    /// Size of the converted language buffer, terminator included.
    pub language_buffer_size: usize,
    /// Extra attempts per handle after an allocation failure.
    pub allocation_retries: u32,
    /// Level the discovery listener runs at.
    pub notify_tpl: Tpl,
}

impl Default for ThunkConfig {
    fn default() -> Self {
        Self {
            language_buffer_size: RFC_4646_ENTRY_SIZE,
            allocation_retries: 0,
            notify_tpl: Tpl::Callback,
        }
    }
}

impl ThunkConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: ThunkConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language_buffer_size < MIN_LANGUAGE_BUFFER_SIZE {
            return Err(ConfigError::BufferTooSmall {
                size: self.language_buffer_size,
                minimum: MIN_LANGUAGE_BUFFER_SIZE,
            });
        }
        if self.allocation_retries > MAX_ALLOCATION_RETRIES {
            return Err(ConfigError::TooManyRetries {
                retries: self.allocation_retries,
                maximum: MAX_ALLOCATION_RETRIES,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(ThunkConfig::from_json("{}").unwrap(), ThunkConfig::default());
    }

    #[test]
    fn default_matches_firmware_buffer() {
        let config = ThunkConfig::default();
        assert_eq!(config.language_buffer_size, 43);
        assert_eq!(config.allocation_retries, 0);
        assert_eq!(config.notify_tpl, Tpl::Callback);
    }

    #[test]
    fn fields_parse() {
        let config = ThunkConfig::from_json(
            r#"{"language_buffer_size": 64, "allocation_retries": 2, "notify_tpl": "notify"}"#,
        )
        .unwrap();
        assert_eq!(config.language_buffer_size, 64);
        assert_eq!(config.allocation_retries, 2);
        assert_eq!(config.notify_tpl, Tpl::Notify);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = ThunkConfig::from_json(r#"{"language_buffer": 64}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn tiny_buffer_is_rejected() {
        let result = ThunkConfig::from_json(r#"{"language_buffer_size": 2}"#);
        assert_eq!(
            result,
            Err(ConfigError::BufferTooSmall {
                size: 2,
                minimum: 3
            })
        );
    }

    #[test]
    fn too_many_retries_is_rejected() {
        let config = ThunkConfig {
            allocation_retries: 9,
            ..ThunkConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyRetries {
                retries: 9,
                maximum: 8
            })
        );
    }

    #[test]
    fn serializes_tpl_lowercase() {
        let json = serde_json::to_value(ThunkConfig::default()).unwrap();
        assert_eq!(json["notify_tpl"], "callback");
    }
}
