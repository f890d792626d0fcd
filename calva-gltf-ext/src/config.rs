use serde::{Deserialize, Serialize};

use crate::{khr_deserializer, khr_serializer, ExtensionDeserializer, ExtensionSerializer};

/// What to do with an extension that has no registered handler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownExtensionPolicy {
    /// Keep the raw JSON in the slot map and write it back untouched.
    #[default]
    Preserve,
    /// Drop it with a warning.
    Skip,
    /// Abort the read or write.
    Fail,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub unknown_extensions: UnknownExtensionPolicy,
    pub pretty: bool,
}

impl Config {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn khr_serializer(&self) -> ExtensionSerializer {
        khr_serializer().with_policy(self.unknown_extensions)
    }

    pub fn khr_deserializer(&self) -> ExtensionDeserializer {
        khr_deserializer().with_policy(self.unknown_extensions)
    }
}

#[test]
fn config_defaults() -> serde_json::Result<()> {
    let config = Config::from_json("{}")?;
    assert_eq!(config, Config::default());
    assert_eq!(config.unknown_extensions, UnknownExtensionPolicy::Preserve);
    assert!(!config.pretty);

    let config = Config::from_json(r#"{ "unknown_extensions": "fail", "pretty": true }"#)?;
    assert_eq!(config.unknown_extensions, UnknownExtensionPolicy::Fail);
    assert!(config.pretty);

    assert!(Config::from_json(r#"{ "unknown_extensions": "explode" }"#).is_err());

    Ok(())
}
