//! Base authoring model, third revision: LUKS volumes may be bound to a CEX key
//!
//! This is the newest base version and the only one translated directly into the wire format
//! (see [`crate::terminal`]).

use kindling_translate::{loc, Report, Translate, Translated, Translator};
use serde::{Deserialize, Serialize};

use crate::v0_5;

pub use crate::v0_5::{
    Clevis, ClevisCustom, Directory, Disk, Dropin, File, HttpHeader, Ignition, IgnitionConfig,
    KernelArguments, Link, NodeGroup, NodeUser, Partition, Passwd, PasswdGroup, PasswdUser, Proxy,
    Raid, Resource, Security, Systemd, Tang, Timeouts, Tls, Unit, Verification,
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
    pub cex: Cex,
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
pub struct Cex {
    pub enabled: Option<bool>,
}

impl Translate<Config> for v0_5::Config {
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

impl Translate<Storage> for v0_5::Storage {
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

impl Translate<Filesystem> for v0_5::Filesystem {
    fn translate(&self, tr: &Translator) -> Translated<Filesystem> {
        tr.recast(self)
    }
}

impl Translate<Luks> for v0_5::Luks {
    fn translate(&self, tr: &Translator) -> Translated<Luks> {
        tr.recast(self)
    }
}
