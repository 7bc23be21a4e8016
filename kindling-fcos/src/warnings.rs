//! Checks over the merged wire document for partition layouts that will likely not boot

use kindling_schema::wire;
use kindling_translate::{loc, Location, Report};

/// Partitions under this size are too small to hold a root filesystem
pub const ROOT_MIN_SIZE_MIB: i64 = 8 * 1024;

/// Labels that belong to the OS image, and the slot each one occupies
const RESERVED_LABELS: [(&str, i64); 5] = [
    ("BIOS-BOOT", 1),
    ("PowerPC-PReP-boot", 1),
    ("EFI-SYSTEM", 2),
    ("boot", 3),
    ("root", 4),
];

/// Warns about partitions that clash with the OS image layout
///
/// Locations are in the wire document, to be correlated back to the authoring config.
pub fn check_partitions(config: &wire::Config) -> Report {
    let mut report = Report::new();
    for (disk_index, disk) in config.storage.disks.iter().enumerate() {
        for (index, partition) in disk.partitions.iter().enumerate() {
            let at = loc!(Target, "storage", "disks", disk_index, "partitions", index);
            let label = partition.label.as_deref();
            if label == Some("root") {
                check_root(&mut report, &at, disk, partition);
            }
            if disk.wipe_table == Some(true) {
                continue;
            }
            let Some(label) = label else {
                continue;
            };
            let expected = RESERVED_LABELS
                .iter()
                .find_map(|&(reserved, slot)| (reserved == label).then_some(slot));
            if let Some(slot) = expected {
                if partition.number != Some(slot) {
                    report.add_warning(
                        at.child("label"),
                        format!(
                            "partition label {label:?} is reserved for partition {slot} of the \
                             OS image and will be assumed to refer to it"
                        ),
                    );
                }
            }
        }
    }
    report
}

fn check_root(
    report: &mut Report,
    at: &Location,
    disk: &wire::Disk,
    partition: &wire::Partition,
) {
    match partition.size_mib {
        Some(size) if size != 0 => {
            if size < ROOT_MIN_SIZE_MIB {
                report.add_warning(
                    at.child("sizeMiB"),
                    format!(
                        "root partition is only {size} MiB; at least {ROOT_MIN_SIZE_MIB} MiB \
                         is recommended"
                    ),
                );
            }
        }
        _ => {
            // Filling the disk only works if nothing follows
            let next = partition.number.unwrap_or(0).checked_add(1);
            let constrained = next.is_some()
                && disk.partitions.iter().any(|other| {
                    other.number == next && other.start_mib.unwrap_or(0) != 0
                });
            if constrained {
                report.add_warning(
                    at.child("number"),
                    "root partition fills the disk but its growth is limited by the partition \
                     that follows it",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kindling_translate::Severity;

    use super::*;

    fn disk(wipe_table: Option<bool>, partitions: Vec<wire::Partition>) -> wire::Config {
        let mut config = wire::Config::default();
        config.storage.disks.push(wire::Disk {
            device: "/dev/vda".into(),
            partitions,
            wipe_table,
        });
        config
    }

    fn partition(label: &str, number: Option<i64>) -> wire::Partition {
        wire::Partition {
            label: Some(label.into()),
            number,
            ..Default::default()
        }
    }

    #[test]
    fn small_root_is_flagged() {
        let mut root = partition("root", Some(4));
        root.size_mib = Some(4096);
        let report = check_partitions(&disk(None, vec![root]));
        assert_eq!(report.count(Severity::Warn), 1);
        assert_eq!(
            report.entries()[0].location,
            Some(loc!(Target, "storage", "disks", 0, "partitions", 0, "sizeMiB"))
        );
    }

    #[test]
    fn large_root_is_fine() {
        let mut root = partition("root", Some(4));
        root.size_mib = Some(ROOT_MIN_SIZE_MIB);
        assert!(check_partitions(&disk(None, vec![root])).is_empty());
    }

    #[test]
    fn unsized_root_followed_by_placed_partition_is_flagged() {
        let root = partition("root", Some(4));
        let mut var = partition("var", Some(5));
        var.start_mib = Some(16384);
        let report = check_partitions(&disk(None, vec![root, var]));
        assert_eq!(report.count(Severity::Warn), 1);
        assert_eq!(
            report.entries()[0].location,
            Some(loc!(Target, "storage", "disks", 0, "partitions", 0, "number"))
        );
    }

    #[test]
    fn unsized_root_followed_by_unplaced_partition_is_fine() {
        let root = partition("root", Some(4));
        let var = partition("var", Some(5));
        assert!(check_partitions(&disk(None, vec![root, var])).is_empty());
    }

    #[test]
    fn unsized_root_with_the_last_possible_number_is_fine() {
        let root = partition("root", Some(i64::MAX));
        let mut other = partition("var", Some(i64::MIN));
        other.start_mib = Some(16384);
        assert!(check_partitions(&disk(Some(true), vec![root, other])).is_empty());
    }

    #[test]
    fn misplaced_reserved_label_is_flagged_unless_table_is_wiped() {
        let partitions = vec![partition("EFI-SYSTEM", Some(3)), partition("boot", Some(3))];
        let report = check_partitions(&disk(None, partitions.clone()));
        assert_eq!(report.count(Severity::Warn), 1);
        assert_eq!(
            report.entries()[0].location,
            Some(loc!(Target, "storage", "disks", 0, "partitions", 0, "label"))
        );

        assert!(check_partitions(&disk(Some(true), partitions)).is_empty());
    }

    #[test]
    fn unnumbered_reserved_label_is_flagged() {
        let report = check_partitions(&disk(Some(false), vec![partition("BIOS-BOOT", None)]));
        assert_eq!(report.count(Severity::Warn), 1);
    }
}
