//! Versioned authoring models and the wire model they compile into
//!
//! Base versions form a chain, oldest first: [`v0_4`] → [`v0_5`] → [`v0_6`] → [`wire`]. Each
//! version re-exports the types it shares with its predecessor and redefines only what changed,
//! together with a [`Translate`] implementation upgrading the predecessor's config into its own.
//! Newer versions are supersets, so upgrading never loses information. Only the newest version
//! translates into the wire format ([`to_wire`]).
//!
//! ```
//! use kindling_config::TranslateOptions;
//! use kindling_schema::{to_wire, upgrade, v0_4, v0_5, v0_6};
//! use kindling_translate::loc;
//!
//! let mut config = v0_4::Config::default();
//! config.storage.raid.push(v0_4::Raid {
//!     name: "md".into(),
//!     options: vec![v0_4::RaidOption("--metadata=1.0".into())],
//!     ..Default::default()
//! });
//!
//! let options = TranslateOptions::default();
//! let first = upgrade::<_, v0_5::Config>(&config, &options);
//! let second = upgrade::<_, v0_6::Config>(&first.value, &options);
//! let wire = to_wire(&second.value, &options);
//!
//! let translations = first
//!     .translations
//!     .map(&second.translations)
//!     .map(&wire.translations);
//! assert_eq!(wire.value.storage.raid[0].options, ["--metadata=1.0"]);
//! assert_eq!(
//!     translations.find_source(&loc!(Target, "storage", "raid", 0, "options", 0)),
//!     Some(loc!(Authoring, "storage", "raid", 0, "options", 0)),
//! );
//! ```

mod resource;
pub mod terminal;
mod units;
mod validate;

pub mod v0_4;
pub mod v0_5;
pub mod v0_6;
pub mod wire;

use kindling_config::TranslateOptions;
use kindling_translate::{Space, Translate, Translated, Translator};

pub use resource::{encode_resource, Encoded, ResourceError};
pub use terminal::to_wire;
pub use units::{escape_path, mount_units};

/// Upgrades a config into the next version of the chain
///
/// Provenance is recorded from the old config's locations to the new one's.
pub fn upgrade<F, T>(from: &F, options: &TranslateOptions) -> Translated<T>
where
    F: Translate<T>,
{
    let tr = Translator::new(Space::Authoring, Space::Authoring, *options);
    let translated = from.translate(&tr);
    tracing::debug!(
        "Upgraded config; {} translations recorded",
        translated.translations.len()
    );
    translated
}
