//! fcos 1.6.0-experimental, built on base version 0.6: adds OS extensions and discard for the
//! encrypted root
//!
//! This is the newest fcos version, so it is the one translated into the wire format. The base
//! config is translated first; the boot device and the other fcos additions are then rendered
//! as separate partial documents and merged in ahead of it.

use kindling_config::TranslateOptions;
use kindling_schema::{v0_5, v0_6, wire};
use kindling_translate::{
    merge_translated, Location, Report, Space, Translate, Translated, TranslationSet, Translator,
};
use serde::{Deserialize, Serialize};

use crate::{boot_device, extensions, grub, v1_5, warnings};

pub use crate::v1_5::{BootDeviceMirror, Grub, GrubUser};

pub const VERSION: &str = "1.6.0-experimental";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub base: v0_6::Config,
    pub boot_device: BootDevice,
    pub extensions: Vec<Extension>,
    pub grub: Grub,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootDevice {
    pub layout: Option<String>,
    pub luks: BootDeviceLuks,
    pub mirror: BootDeviceMirror,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootDeviceLuks {
    pub discard: Option<bool>,
    pub tang: Vec<v0_5::Tang>,
    pub threshold: Option<i64>,
    pub tpm2: Option<bool>,
}

/// An OS extension package to layer onto the image
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extension {
    pub name: String,
}

impl Config {
    pub fn validate(&self) -> Report {
        let mut report = self.base.validate();
        report.merge(crate::validate::boot_device(
            self.boot_device.layout.as_deref(),
            &self.boot_device.mirror.devices,
            self.boot_device.luks.tang.iter().map(|tang| tang.url.as_str()),
        ));
        report.merge(crate::validate::grub_users(&self.grub.users));
        report.merge(crate::validate::extensions(&self.extensions));
        report
    }

    /// Translates into the wire format
    ///
    /// Assumes the config has been validated.
    pub fn to_wire(&self, options: &TranslateOptions) -> Translated<wire::Config> {
        let (mut config, mut translations, mut report) =
            kindling_schema::to_wire(&self.base, options).into_parts();
        if report.is_fatal() {
            return Translated::new(config, translations, report);
        }

        if let Some(rendered) = boot_device::desugar(&self.boot_device, options) {
            tracing::debug!("Desugared boot device");
            fold(&mut config, &mut translations, &mut report, rendered);
        }
        report.merge(warnings::check_partitions(&config));

        let rendered = extensions::render(&self.extensions, options);
        fold(&mut config, &mut translations, &mut report, rendered);
        let rendered = grub::render(&self.grub, options);
        fold(&mut config, &mut translations, &mut report, rendered);

        Translated::new(config, translations, report)
    }
}

/// Merges a rendered partial document in ahead of the main one
fn fold(
    config: &mut wire::Config,
    translations: &mut TranslationSet,
    report: &mut Report,
    rendered: Translated<wire::Config>,
) {
    report.merge(rendered.report);
    if rendered.translations.is_empty() {
        return;
    }
    match merge_translated(&rendered.value, &rendered.translations, config, translations) {
        Ok((merged, merged_translations)) => {
            *config = merged;
            *translations = merged_translations;
        }
        Err(e) => {
            let location = e
                .location()
                .cloned()
                .unwrap_or_else(|| Location::root(Space::Target));
            report.add_fatal(location, e);
        }
    }
}

impl Translate<Config> for v1_5::Config {
    fn translate(&self, tr: &Translator) -> Translated<Config> {
        let mut session = tr.session();
        let mut out = Config::default();
        session.flatten(&self.base, &mut out.base);
        out.base.version = VERSION.to_owned();
        session.translate("boot_device", &self.boot_device, &mut out.boot_device);
        session.translate("grub", &self.grub, &mut out.grub);
        session.finish(out)
    }
}

impl Translate<BootDevice> for v1_5::BootDevice {
    fn translate(&self, tr: &Translator) -> Translated<BootDevice> {
        tr.recast(self)
    }
}
