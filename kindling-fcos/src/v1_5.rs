//! fcos 1.5.0, built on base version 0.5: adds GRUB superusers

use kindling_config::TranslateOptions;
use kindling_schema::{upgrade, v0_5, wire};
use kindling_translate::{Report, Translate, Translated, Translator};
use serde::{Deserialize, Serialize};

use crate::{chain, v1_4, v1_6};

pub use crate::v1_4::BootDeviceMirror;

pub const VERSION: &str = "1.5.0";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub base: v0_5::Config,
    pub boot_device: BootDevice,
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
    pub tang: Vec<v0_5::Tang>,
    pub threshold: Option<i64>,
    pub tpm2: Option<bool>,
}

/// Bootloader settings
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grub {
    pub users: Vec<GrubUser>,
}

/// A GRUB superuser, identified by a PBKDF2 password hash
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrubUser {
    pub name: String,
    pub password_hash: Option<String>,
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
        report
    }

    pub fn to_wire(&self, options: &TranslateOptions) -> Translated<wire::Config> {
        let next = upgrade::<_, v1_6::Config>(self, options);
        let rest = next.value.to_wire(options);
        chain(next, rest)
    }
}

impl Translate<Config> for v1_4::Config {
    fn translate(&self, tr: &Translator) -> Translated<Config> {
        let mut session = tr.session();
        let mut out = Config::default();
        session.flatten(&self.base, &mut out.base);
        out.base.version = VERSION.to_owned();
        session.translate("boot_device", &self.boot_device, &mut out.boot_device);
        session.finish(out)
    }
}

impl Translate<BootDevice> for v1_4::BootDevice {
    fn translate(&self, tr: &Translator) -> Translated<BootDevice> {
        tr.recast(self)
    }
}
