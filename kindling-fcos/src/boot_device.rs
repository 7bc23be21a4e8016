//! Expansion of a `boot_device` declaration into disks, RAID arrays, LUKS and filesystems
//!
//! The partitions written here replicate the layout of the OS image, so that the root disk can
//! be re-partitioned in place. A replicated partition must never be smaller than the one it
//! replaces, and the BIOS boot partition must stay at its original offset. The sizes and type
//! GUIDs below must not change; a new layout needs a new template.

use kindling_config::TranslateOptions;
use kindling_schema::wire;
use kindling_translate::{loc, Report, Space, Translated, TranslationSet, Translator};

use crate::v1_6::{BootDevice, BootDeviceLuks};

pub const RESERVED_SIZE_MIB: i64 = 1;
pub const BIOS_SIZE_MIB: i64 = 1;
pub const PREP_SIZE_MIB: i64 = 4;
pub const ESP_SIZE_MIB: i64 = 127;
pub const BOOT_SIZE_MIB: i64 = 384;

pub const RESERVED_TYPE_GUID: &str = "8DA63339-0007-60C0-C436-083AC8230908";
pub const BIOS_TYPE_GUID: &str = "21686148-6449-6E6F-744E-656564454649";
pub const PREP_TYPE_GUID: &str = "9E1A2D38-C612-4316-AA26-8B49521E5A8B";
pub const ESP_TYPE_GUID: &str = "C12A7328-F81F-11D2-BA4B-00A0C93EC93B";

/// The partition template of an architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    X86_64,
    Aarch64,
    Ppc64le,
}

impl Layout {
    /// Panics on anything validation would have rejected
    fn from_name(name: Option<&str>) -> Self {
        match name {
            None | Some("x86_64") => Layout::X86_64,
            Some("aarch64") => Layout::Aarch64,
            Some("ppc64le") => Layout::Ppc64le,
            Some(other) => panic!("unknown boot device layout {other:?}"),
        }
    }

    fn has_esp(self) -> bool {
        matches!(self, Layout::X86_64 | Layout::Aarch64)
    }

    /// The partition at the start of each mirrored disk
    fn first_partition(self, n: usize) -> wire::Partition {
        match self {
            Layout::X86_64 => partition(format!("bios-{n}"), Some(BIOS_SIZE_MIB), Some(BIOS_TYPE_GUID)),
            Layout::Ppc64le => partition(format!("prep-{n}"), Some(PREP_SIZE_MIB), Some(PREP_TYPE_GUID)),
            Layout::Aarch64 => reserved(n),
        }
    }

    /// The partition following the first
    fn second_partition(self, n: usize) -> wire::Partition {
        if self.has_esp() {
            partition(format!("esp-{n}"), Some(ESP_SIZE_MIB), Some(ESP_TYPE_GUID))
        } else {
            reserved(n)
        }
    }
}

fn partition(label: String, size_mib: Option<i64>, type_guid: Option<&str>) -> wire::Partition {
    wire::Partition {
        label: Some(label),
        size_mib,
        type_guid: type_guid.map(str::to_owned),
        ..Default::default()
    }
}

fn reserved(n: usize) -> wire::Partition {
    partition(
        format!("reserved-{n}"),
        Some(RESERVED_SIZE_MIB),
        Some(RESERVED_TYPE_GUID),
    )
}

fn filesystem(device: String, format: &str, label: String) -> wire::Filesystem {
    wire::Filesystem {
        device,
        format: Some(format.to_owned()),
        label: Some(label),
        wipe_filesystem: Some(true),
        ..Default::default()
    }
}

/// Renders the boot device as a partial document, or nothing if neither LUKS nor mirroring
/// was asked for
///
/// Assumes the declaration has been validated; an unknown layout panics.
pub fn desugar(
    boot_device: &BootDevice,
    options: &TranslateOptions,
) -> Option<Translated<wire::Config>> {
    let luks = &boot_device.luks;
    let devices = &boot_device.mirror.devices;
    let want_luks = luks.tpm2 == Some(true) || !luks.tang.is_empty();
    let want_mirror = !devices.is_empty();
    if !want_luks && !want_mirror {
        return None;
    }
    let layout = Layout::from_name(boot_device.layout.as_deref());

    let mut rendered = wire::Config::default();
    let mut translations = TranslationSet::new(Space::Authoring, Space::Target);
    let mut report = Report::new();
    let storage = &mut rendered.storage;
    let source = loc!(Authoring, "boot_device");

    if want_mirror {
        let mirror = source.child("mirror");
        for (index, device) in devices.iter().enumerate() {
            let n = storage.disks.len() + 1;
            let disk = wire::Disk {
                device: device.clone(),
                wipe_table: Some(true),
                partitions: vec![
                    layout.first_partition(n),
                    layout.second_partition(n),
                    partition(format!("boot-{n}"), Some(BOOT_SIZE_MIB), None),
                    partition(format!("root-{n}"), None, None),
                ],
            };
            let from = mirror.child("devices").append(index);
            translations.add_from_common_source(
                &from,
                &loc!(Target, "storage", "disks", storage.disks.len()),
                &disk,
            );
            storage.disks.push(disk);

            if layout.has_esp() {
                let esp = filesystem(
                    format!("/dev/disk/by-partlabel/esp-{n}"),
                    "vfat",
                    format!("esp-{n}"),
                );
                translations.add_from_common_source(
                    &from,
                    &loc!(Target, "storage", "filesystems", storage.filesystems.len()),
                    &esp,
                );
                storage.filesystems.push(esp);
            }
        }
        translations.add_translation(mirror.child("devices"), loc!(Target, "storage", "disks"));

        let members = |prefix: &str| -> Vec<String> {
            (1..=devices.len())
                .map(|n| format!("/dev/disk/by-partlabel/{prefix}-{n}"))
                .collect()
        };
        storage.raid = vec![
            wire::Raid {
                devices: members("boot"),
                level: Some("raid1".to_owned()),
                name: "md-boot".to_owned(),
                // Superblock at the end of the partition, so BIOS GRUB needn't understand RAID
                options: vec!["--metadata=1.0".to_owned()],
                ..Default::default()
            },
            wire::Raid {
                devices: members("root"),
                level: Some("raid1".to_owned()),
                name: "md-root".to_owned(),
                ..Default::default()
            },
        ];
        translations.add_from_common_source(&mirror, &loc!(Target, "storage", "raid"), &storage.raid);

        let boot = filesystem("/dev/md/md-boot".to_owned(), "ext4", "boot".to_owned());
        translations.add_from_common_source(
            &mirror,
            &loc!(Target, "storage", "filesystems", storage.filesystems.len()),
            &boot,
        );
        storage.filesystems.push(boot);
    }

    if want_luks {
        let from = source.child("luks");
        let to = loc!(Target, "storage", "luks", 0);
        let device = if want_mirror {
            "/dev/md/md-root"
        } else {
            "/dev/disk/by-partlabel/root"
        };
        let clevis = clevis(luks, options);
        if let Err(e) = translations.merge(
            clevis
                .translations
                .prefixed(from.steps(), to.child("clevis").steps()),
        ) {
            report.add_fatal(from.clone(), e);
        }
        report.merge(clevis.report.prefixed(&from));
        storage.luks = vec![wire::Luks {
            clevis: clevis.value,
            device: Some(device.to_owned()),
            discard: luks.discard,
            label: Some("luks-root".to_owned()),
            name: "root".to_owned(),
            wipe_volume: Some(true),
            ..Default::default()
        }];
        for field in ["device", "label", "name", "wipeVolume"] {
            translations.add_translation(from.clone(), to.child(field));
        }
        if luks.discard.is_some() {
            translations.add_translation(from.child("discard"), to.child("discard"));
        }
        translations.add_translation(from.clone(), to);
        translations.add_translation(from, loc!(Target, "storage", "luks"));
    }

    let root_device = match (want_luks, want_mirror) {
        // LUKS, or LUKS on RAID
        (true, _) => "/dev/mapper/root",
        (false, true) => "/dev/md/md-root",
        (false, false) => panic!("boot device has neither LUKS nor a mirror"),
    };
    let root = filesystem(root_device.to_owned(), "xfs", "root".to_owned());
    translations.add_from_common_source(
        &source,
        &loc!(Target, "storage", "filesystems", storage.filesystems.len()),
        &root,
    );
    translations.add_translation(source.clone(), loc!(Target, "storage", "filesystems"));
    storage.filesystems.push(root);

    translations.add_translation(source, loc!(Target, "storage"));
    Some(Translated::new(rendered, translations, report))
}

/// The Clevis binding of the encrypted root, with locations relative to `boot_device.luks`
fn clevis(luks: &BootDeviceLuks, options: &TranslateOptions) -> Translated<wire::Clevis> {
    let tr = Translator::new(Space::Authoring, Space::Target, *options).with_rename(wire::wire_name);
    let mut session = tr.session();
    let mut out = wire::Clevis::default();
    session.auto("tang", &luks.tang, &mut out.tang);
    session.merge_field("threshold", &luks.threshold, &mut out.threshold);
    session.merge_field("tpm2", &luks.tpm2, &mut out.tpm2);
    session.finish(out)
}
