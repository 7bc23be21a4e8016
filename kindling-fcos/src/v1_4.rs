//! fcos 1.4.0, built on base version 0.4

use kindling_config::TranslateOptions;
use kindling_schema::{upgrade, v0_4, wire};
use kindling_translate::{Report, Translated};
use serde::{Deserialize, Serialize};

use crate::{chain, v1_5};

pub const VERSION: &str = "1.4.0";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub base: v0_4::Config,
    pub boot_device: BootDevice,
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
    pub tang: Vec<v0_4::Tang>,
    pub threshold: Option<i64>,
    pub tpm2: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootDeviceMirror {
    pub devices: Vec<String>,
}

impl Config {
    pub fn validate(&self) -> Report {
        let mut report = self.base.validate();
        report.merge(crate::validate::boot_device(
            self.boot_device.layout.as_deref(),
            &self.boot_device.mirror.devices,
            self.boot_device.luks.tang.iter().map(|tang| tang.url.as_str()),
        ));
        report
    }

    pub fn to_wire(&self, options: &TranslateOptions) -> Translated<wire::Config> {
        let next = upgrade::<_, v1_5::Config>(self, options);
        let rest = next.value.to_wire(options);
        chain(next, rest)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use kindling_translate::loc;

    use super::*;

    #[test]
    fn base_fields_sit_alongside_boot_device() {
        let config: Config = serde_yaml::from_str(indoc!(
            "
            version: 1.4.0
            variant: fcos
            storage:
              disks:
                - device: /dev/vdb
            boot_device:
              layout: ppc64le
              luks:
                tang:
                  - url: ''
            "
        ))
        .unwrap();
        assert_eq!(config.base.storage.disks[0].device, "/dev/vdb");
        assert_eq!(config.boot_device.layout.as_deref(), Some("ppc64le"));

        let report = config.validate();
        assert_eq!(report.entries().len(), 1);
        assert_eq!(
            report.entries()[0].location,
            Some(loc!(Authoring, "boot_device", "luks", "tang", 0, "url"))
        );
    }
}
