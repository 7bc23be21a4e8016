//! Base authoring model, second revision
//!
//! Adds LUKS `discard` and `open_options`, Tang `advertisement`, plain-string RAID and LUKS
//! options, and mount units for swap.

use kindling_translate::{loc, Report, Translate, Translated, Translator};
use serde::{Deserialize, Serialize};

use crate::v0_4;

pub use crate::v0_4::{
    ClevisCustom, Directory, Disk, Dropin, File, HttpHeader, Ignition, IgnitionConfig,
    KernelArguments, Link, NodeGroup, NodeUser, Partition, Passwd, PasswdGroup, PasswdUser, Proxy,
    Resource, Security, Systemd, Timeouts, Tls, Unit, Verification,
};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    pub variant: String,
    pub ignition: Ignition,
    pub kernel_arguments: KernelArguments,
    pub passwd: Passwd,
    pub storage: Storage,
    pub systemd: Systemd,
}

impl Config {
    pub fn validate(&self) -> Report {
        let mut report = Report::new();
        for (index, filesystem) in self.storage.filesystems.iter().enumerate() {
            report.merge(
                filesystem
                    .validate()
                    .prefixed(&loc!(Authoring, "storage", "filesystems", index)),
            );
        }
        report
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub directories: Vec<Directory>,
    pub disks: Vec<Disk>,
    pub files: Vec<File>,
    pub filesystems: Vec<Filesystem>,
    pub links: Vec<Link>,
    pub luks: Vec<Luks>,
    pub raid: Vec<Raid>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filesystem {
    pub device: String,
    pub format: Option<String>,
    pub label: Option<String>,
    pub mount_options: Vec<String>,
    pub options: Vec<String>,
    pub path: Option<String>,
    pub uuid: Option<String>,
    pub wipe_filesystem: Option<bool>,
    pub with_mount_unit: Option<bool>,
}

impl Filesystem {
    pub fn validate(&self) -> Report {
        crate::validate::mount_unit(
            self.with_mount_unit,
            self.format.as_deref(),
            self.path.as_deref(),
            true,
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Luks {
    pub clevis: Clevis,
    pub device: Option<String>,
    pub discard: Option<bool>,
    pub key_file: Resource,
    pub label: Option<String>,
    pub name: String,
    pub open_options: Vec<String>,
    pub options: Vec<String>,
    pub uuid: Option<String>,
    pub wipe_volume: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clevis {
    pub custom: ClevisCustom,
    pub tang: Vec<Tang>,
    pub threshold: Option<i64>,
    pub tpm2: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tang {
    pub thumbprint: Option<String>,
    pub url: String,
    pub advertisement: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Raid {
    pub devices: Vec<String>,
    pub level: Option<String>,
    pub name: String,
    pub options: Vec<String>,
    pub spares: Option<i64>,
}

impl Translate<Config> for v0_4::Config {
    fn translate(&self, tr: &Translator) -> Translated<Config> {
        let mut session = tr.session();
        let mut out = Config::default();
        session.translate("version", &self.version, &mut out.version);
        session.translate("variant", &self.variant, &mut out.variant);
        session.translate("ignition", &self.ignition, &mut out.ignition);
        session.translate(
            "kernel_arguments",
            &self.kernel_arguments,
            &mut out.kernel_arguments,
        );
        session.translate("passwd", &self.passwd, &mut out.passwd);
        session.translate("storage", &self.storage, &mut out.storage);
        session.translate("systemd", &self.systemd, &mut out.systemd);
        session.finish(out)
    }
}

impl Translate<Storage> for v0_4::Storage {
    fn translate(&self, tr: &Translator) -> Translated<Storage> {
        let mut session = tr.session();
        let mut out = Storage::default();
        session.prefixed("directories", &self.directories, &mut out.directories);
        session.prefixed("disks", &self.disks, &mut out.disks);
        session.prefixed("files", &self.files, &mut out.files);
        session.prefixed("filesystems", &self.filesystems, &mut out.filesystems);
        session.prefixed("links", &self.links, &mut out.links);
        session.prefixed("luks", &self.luks, &mut out.luks);
        session.prefixed("raid", &self.raid, &mut out.raid);
        session.finish(out)
    }
}

impl Translate<Filesystem> for v0_4::Filesystem {
    fn translate(&self, tr: &Translator) -> Translated<Filesystem> {
        tr.recast(self)
    }
}

impl Translate<Luks> for v0_4::Luks {
    fn translate(&self, tr: &Translator) -> Translated<Luks> {
        let mut session = tr.session();
        let mut out = Luks::default();
        session.auto("clevis", &self.clevis, &mut out.clevis);
        session.merge_field("device", &self.device, &mut out.device);
        session.translate("key_file", &self.key_file, &mut out.key_file);
        session.merge_field("label", &self.label, &mut out.label);
        session.translate("name", &self.name, &mut out.name);
        session.prefixed("options", &self.options, &mut out.options);
        session.merge_field("uuid", &self.uuid, &mut out.uuid);
        session.merge_field("wipe_volume", &self.wipe_volume, &mut out.wipe_volume);
        session.finish(out)
    }
}

impl Translate<Raid> for v0_4::Raid {
    fn translate(&self, tr: &Translator) -> Translated<Raid> {
        let mut session = tr.session();
        let mut out = Raid::default();
        session.translate("devices", &self.devices, &mut out.devices);
        session.merge_field("level", &self.level, &mut out.level);
        session.translate("name", &self.name, &mut out.name);
        session.prefixed("options", &self.options, &mut out.options);
        session.merge_field("spares", &self.spares, &mut out.spares);
        session.finish(out)
    }
}

macro_rules! unwrap_option {
    ($option:ty) => {
        impl Translate<String> for $option {
            fn translate(&self, tr: &Translator) -> Translated<String> {
                let mut translations = tr.empty_set();
                translations.add_translation(tr.source_root(), tr.dest_root());
                Translated::new(self.0.clone(), translations, Report::new())
            }
        }
    };
}

unwrap_option!(v0_4::LuksOption);
unwrap_option!(v0_4::RaidOption);
