//! TOML-backed batch configuration.
//!
//! ```toml
//! [batch]
//! batch_size = 500
//! offset = 0
//! to = 10000
//!
//! [batch.order_by]
//! created_at = "desc"
//! ```
//!
//! Every key is optional; missing keys take the [`BatchOptions`] defaults.


use crate::{
    db::{batch::BatchOptions, query::OrderSpec},
    error::ConfigError,
};
use serde::Deserialize;
use std::{fs, path::Path};

///
/// ConfigFile
///

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    batch: RawBatchConfig,
}

///
/// RawBatchConfig
/// Untyped numeric values so malformed options can be reported by name.
///

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBatchConfig {
    batch_size: Option<toml::Value>,
    offset: Option<toml::Value>,
    to: Option<toml::Value>,
    order_by: Option<OrderSpec>,
}

///
/// BatchConfig
///
/// Validated batch options loaded from configuration.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BatchConfig {
    options: BatchOptions,
}

impl BatchConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;

        file.batch.validate()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;

        Self::from_toml_str(&source)
    }

    #[must_use]
    pub const fn options(&self) -> &BatchOptions {
        &self.options
    }

    #[must_use]
    pub fn into_options(self) -> BatchOptions {
        self.options
    }
}

impl From<BatchConfig> for BatchOptions {
    fn from(config: BatchConfig) -> Self {
        config.into_options()
    }
}

impl RawBatchConfig {
    fn validate(self) -> Result<BatchConfig, ConfigError> {
        let mut options = BatchOptions::default();

        if let Some(value) = self.batch_size {
            options.batch_size = non_negative("batch_size", &value)?;
            if options.batch_size == 0 {
                return Err(ConfigError::ZeroBatchSize);
            }
        }
        if let Some(value) = self.offset {
            options.offset = non_negative("offset", &value)?;
        }
        if let Some(value) = self.to {
            options.to = Some(non_negative("to", &value)?);
        }
        if let Some(order_by) = self.order_by {
            if order_by.is_empty() {
                return Err(ConfigError::malformed(
                    "order_by",
                    "expected at least one field",
                ));
            }
            options.order_by = order_by;
        }

        // `to` may still come from a count; only a known end can be checked here
        if let Some(to) = options.to
            && options.offset > to
        {
            return Err(ConfigError::OffsetPastEnd {
                offset: options.offset,
                to,
            });
        }

        Ok(BatchConfig { options })
    }
}

fn non_negative(option: &str, value: &toml::Value) -> Result<u64, ConfigError> {
    match value {
        toml::Value::Integer(n) => u64::try_from(*n).map_err(|_| {
            ConfigError::malformed(option, format!("expected a non-negative integer, found {n}"))
        }),
        other => Err(ConfigError::malformed(
            option,
            format!("expected an integer, found {}", other.type_str()),
        )),
    }
}
