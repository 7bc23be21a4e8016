//! The building blocks every translation stage is made from
//!
//! A stage converts one document model into another. Alongside its output it returns a
//! [`TranslationSet`] recording which [`Location`]s of its input each part of the output came
//! from, and a [`Report`] of anything it noticed. Provenance is never stored inside the
//! documents themselves.
//!
//! Field-by-field conversions implement [`Translate`] using a [`Session`]:
//! ```
//! use kindling_config::TranslateOptions;
//! use kindling_translate::{loc, Space, Translate, Translated, Translator};
//!
//! struct Luks { device: Option<String>, discard: Option<bool> }
//! #[derive(Default)]
//! struct WireLuks { device: Option<String>, discard: Option<bool> }
//!
//! impl Translate<WireLuks> for Luks {
//!     fn translate(&self, tr: &Translator) -> Translated<WireLuks> {
//!         let mut session = tr.session();
//!         let mut out = WireLuks::default();
//!         session.merge_field("device", &self.device, &mut out.device);
//!         session.merge_field("discard", &self.discard, &mut out.discard);
//!         session.finish(out)
//!     }
//! }
//!
//! let tr = Translator::new(Space::Authoring, Space::Target, TranslateOptions::default());
//! let luks = Luks { device: Some("/dev/vda4".into()), discard: Some(false) };
//! let translated = luks.translate(&tr);
//!
//! assert_eq!(translated.value.discard, Some(false));
//! assert_eq!(
//!     translated.translations.find_source(&loc!(Target, "discard")),
//!     Some(loc!(Authoring, "discard")),
//! );
//! assert!(translated.report.is_empty());
//! ```
//!
//! Partial documents built independently are combined with [`merge_translated`].
#![warn(missing_docs)]

mod error;
mod location;
mod merge;
mod report;
mod set;
mod translator;
pub mod tree;

pub use error::MergeError;
pub use location::{Location, Space, Step};
pub use merge::merge_translated;
pub use report::{Entry, Report, Severity};
pub use set::TranslationSet;
pub use translator::{same_name, KeyRename, Session, Translate, Translated, Translator};
