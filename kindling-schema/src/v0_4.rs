//! The oldest supported base authoring model
//!
//! Every later version is expressed as a delta over this one: types that do not change are
//! re-exported under the later version's name, and only changed types are redefined.

use kindling_translate::{loc, Report};
use serde::{Deserialize, Serialize};

use crate::validate;

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
    /// Checks the document for problems that would stop it translating as intended
    pub fn validate(&self) -> Report {
        let mut report = Report::new();
        for (index, filesystem) in self.storage.filesystems.iter().enumerate() {
            report.merge(
                filesystem
                    .validate(false)
                    .prefixed(&loc!(Authoring, "storage", "filesystems", index)),
            );
        }
        report
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ignition {
    pub config: IgnitionConfig,
    pub proxy: Proxy,
    pub security: Security,
    pub timeouts: Timeouts,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnitionConfig {
    pub merge: Vec<Resource>,
    pub replace: Resource,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proxy {
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub no_proxy: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    pub tls: Tls,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tls {
    pub certificate_authorities: Vec<Resource>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub http_response_headers: Option<i64>,
    pub http_total: Option<i64>,
}

/// Content given either by URL (`source`) or written out in the config (`inline`)
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    pub compression: Option<String>,
    pub http_headers: Vec<HttpHeader>,
    pub source: Option<String>,
    pub inline: Option<String>,
    pub verification: Verification,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpHeader {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verification {
    pub hash: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelArguments {
    pub should_exist: Vec<String>,
    pub should_not_exist: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Passwd {
    pub groups: Vec<PasswdGroup>,
    pub users: Vec<PasswdUser>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswdUser {
    pub gecos: Option<String>,
    pub groups: Vec<String>,
    pub home_dir: Option<String>,
    pub name: String,
    pub no_create_home: Option<bool>,
    pub password_hash: Option<String>,
    pub primary_group: Option<String>,
    pub shell: Option<String>,
    pub ssh_authorized_keys: Vec<String>,
    pub system: Option<bool>,
    pub uid: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswdGroup {
    pub gid: Option<i64>,
    pub name: String,
    pub password_hash: Option<String>,
    pub system: Option<bool>,
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
pub struct NodeUser {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeGroup {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directory {
    pub group: NodeGroup,
    pub mode: Option<i64>,
    pub overwrite: Option<bool>,
    pub path: String,
    pub user: NodeUser,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub append: Vec<Resource>,
    pub contents: Resource,
    pub group: NodeGroup,
    pub mode: Option<i64>,
    pub overwrite: Option<bool>,
    pub path: String,
    pub user: NodeUser,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub group: NodeGroup,
    pub hard: Option<bool>,
    pub overwrite: Option<bool>,
    pub path: String,
    pub target: Option<String>,
    pub user: NodeUser,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disk {
    pub device: String,
    pub partitions: Vec<Partition>,
    pub wipe_table: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Partition {
    pub guid: Option<String>,
    pub label: Option<String>,
    pub number: Option<i64>,
    pub resize: Option<bool>,
    pub should_exist: Option<bool>,
    pub size_mib: Option<i64>,
    pub start_mib: Option<i64>,
    pub type_guid: Option<String>,
    pub wipe_partition_entry: Option<bool>,
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
    /// Not part of the wire format: asks for a systemd unit mounting this filesystem
    pub with_mount_unit: Option<bool>,
}

impl Filesystem {
    /// Checks the mount unit request, if any
    pub fn validate(&self, swap_units: bool) -> Report {
        validate::mount_unit(
            self.with_mount_unit,
            self.format.as_deref(),
            self.path.as_deref(),
            swap_units,
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Luks {
    pub clevis: Clevis,
    pub device: Option<String>,
    pub key_file: Resource,
    pub label: Option<String>,
    pub name: String,
    pub options: Vec<LuksOption>,
    pub uuid: Option<String>,
    pub wipe_volume: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LuksOption(pub String);

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
pub struct ClevisCustom {
    pub config: Option<String>,
    pub needs_network: Option<bool>,
    pub pin: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tang {
    pub thumbprint: Option<String>,
    pub url: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Raid {
    pub devices: Vec<String>,
    pub level: Option<String>,
    pub name: String,
    pub options: Vec<RaidOption>,
    pub spares: Option<i64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaidOption(pub String);

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Systemd {
    pub units: Vec<Unit>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unit {
    pub contents: Option<String>,
    pub dropins: Vec<Dropin>,
    pub enabled: Option<bool>,
    pub mask: Option<bool>,
    pub name: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dropin {
    pub contents: Option<String>,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn swap_mount_units_are_too_new() {
        let config: Config = serde_yaml::from_str(indoc!(
            "
            version: 1.4.0
            variant: fcos
            storage:
              filesystems:
                - device: /dev/vdb
                  format: swap
                  with_mount_unit: true
            "
        ))
        .unwrap();
        let report = config.validate();
        assert_eq!(report.entries().len(), 1);
        assert_eq!(
            report.entries()[0].location,
            Some(loc!(Authoring, "storage", "filesystems", 0, "format"))
        );
    }

    #[test]
    fn options_are_plain_strings_in_yaml() {
        let raid: Raid = serde_yaml::from_str("{name: md, options: [--foo]}").unwrap();
        assert_eq!(raid.options, vec![RaidOption("--foo".into())]);
    }
}
