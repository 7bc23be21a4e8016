use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::Deserialize;

/// Deserialization of kindling.toml
#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Options controlling translation
    #[serde(default)]
    pub translate: TranslateSection,
}

/// The `[translate]` table of kindling.toml
///
/// Unset values leave the defaults (or command line choices) in place.
#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct TranslateSection {
    /// Never gzip embedded resources
    pub no_resource_auto_compression: Option<bool>,
    /// Treat warnings as failures
    pub strict: Option<bool>,
}

impl ConfigFile {
    /// Load a configuration from the specified file
    ///
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_context = || format!("Reading config file {path:?}");
        let config_data = std::fs::read_to_string(path).with_context(config_context)?;
        tracing::debug!("Loaded config file {}", path);
        config_data
            .as_str()
            .try_into()
            .with_context(|| format!("Parsing config file {path:?}"))
    }
}

impl TryFrom<&str> for ConfigFile {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(toml::from_str(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TranslateOptions;

    #[test]
    fn empty_file_uses_defaults() {
        let config: ConfigFile = "".try_into().unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(TranslateOptions::from(config), TranslateOptions::default());
    }

    #[test]
    fn section_overrides_only_what_it_sets() {
        let config: ConfigFile = "[translate]\nstrict = true\n".try_into().unwrap();
        let mut options = TranslateOptions {
            no_resource_auto_compression: true,
            strict: false,
        };
        options.apply(&config.translate);
        assert!(options.strict);
        assert!(options.no_resource_auto_compression);
    }

    #[test]
    fn unknown_value_type_is_rejected() {
        let result: Result<ConfigFile> = "[translate]\nstrict = \"yes\"\n".try_into();
        assert!(result.is_err());
    }
}
