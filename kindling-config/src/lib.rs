//! Configuration for the compiler
//!
//! Options may be given on the command line or in a `kindling.toml` file:
//! ```
//! # use kindling_config::{ConfigFile, TranslateOptions};
//! let config: ConfigFile = r#"
//!     [translate]
//!     no_resource_auto_compression = true
//! "#.try_into()?;
//! let options = TranslateOptions::from(config);
//! assert!(options.no_resource_auto_compression);
//! assert!(!options.strict);
//! # Ok::<(), anyhow::Error>(())
//! ```
#![warn(missing_docs)]

mod file;
pub use file::{ConfigFile, TranslateSection};

/// Options affecting how a config is translated
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Never gzip resources embedded into the output, even where it would make them smaller
    pub no_resource_auto_compression: bool,

    /// Treat warnings as failures
    pub strict: bool,
}

impl TranslateOptions {
    /// Whether embedded resources may be compressed automatically
    pub fn allow_auto_compression(&self) -> bool {
        !self.no_resource_auto_compression
    }

    /// Overlays any values set in the config file section onto these options
    pub fn apply(&mut self, section: &TranslateSection) {
        if let Some(value) = section.no_resource_auto_compression {
            self.no_resource_auto_compression = value;
        }
        if let Some(value) = section.strict {
            self.strict = value;
        }
    }
}

impl From<ConfigFile> for TranslateOptions {
    fn from(config: ConfigFile) -> Self {
        let mut options = TranslateOptions::default();
        options.apply(&config.translate);
        options
    }
}
