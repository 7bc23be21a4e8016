//! The fcos variant: a base config plus boot device, bootloader and OS extension settings
//!
//! Each fcos version builds on one base version and, like the base versions, upgrades into the
//! next: [`v1_4`] → [`v1_5`] → [`v1_6`]. Only the newest translates into the wire format
//! directly; older versions upgrade and then [`chain`] onto the newer translation.
//!
//! ```
//! use kindling_config::TranslateOptions;
//! use kindling_fcos::v1_4;
//! use kindling_translate::loc;
//!
//! let config: v1_4::Config = serde_yaml::from_str(
//!     "
//!     version: 1.4.0
//!     variant: fcos
//!     boot_device:
//!       mirror:
//!         devices: [/dev/vda, /dev/vdb]
//!     ",
//! )?;
//! let wire = config.to_wire(&TranslateOptions::default());
//!
//! assert_eq!(wire.value.storage.raid.len(), 2);
//! assert_eq!(
//!     wire.translations.find_source(&loc!(Target, "storage", "disks", 1, "device")),
//!     Some(loc!(Authoring, "boot_device", "mirror", "devices", 1)),
//! );
//! # Ok::<(), serde_yaml::Error>(())
//! ```

pub mod boot_device;
mod extensions;
mod grub;
mod validate;
mod warnings;

pub mod v1_4;
pub mod v1_5;
pub mod v1_6;

use kindling_schema::wire;
use kindling_translate::Translated;

pub use validate::LAYOUTS;
pub use warnings::{check_partitions, ROOT_MIN_SIZE_MIB};

/// The name of this variant, as given in a config's `variant` field
pub const VARIANT: &str = "fcos";

/// Composes an upgrade with the translation of its result
///
/// The combined provenance leads from the older config straight to the wire document, and the
/// diagnostics of both stages are kept in order.
pub fn chain<A>(step: Translated<A>, rest: Translated<wire::Config>) -> Translated<wire::Config> {
    let translations = step.translations.map(&rest.translations);
    let mut report = step.report;
    report.merge(rest.report);
    Translated::new(rest.value, translations, report)
}
