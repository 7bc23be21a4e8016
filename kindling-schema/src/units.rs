//! Generated systemd units for filesystems that ask to be mounted

use kindling_translate::{loc, Space, TranslationSet};

use crate::{v0_6, wire};

/// Builds a partial document holding a unit for each filesystem with `with_mount_unit` set
///
/// Each unit is attributed to the filesystem that asked for it. Filesystems are assumed to have
/// been validated: a mount needs a path, and every unit needs a format.
pub fn mount_units(filesystems: &[v0_6::Filesystem]) -> (wire::Config, TranslationSet) {
    let mut config = wire::Config::default();
    let mut translations = TranslationSet::new(Space::Authoring, Space::Target);
    for (index, filesystem) in filesystems.iter().enumerate() {
        if filesystem.with_mount_unit != Some(true) {
            continue;
        }
        let unit = if filesystem.format.as_deref() == Some("swap") {
            swap_unit(filesystem)
        } else {
            mount_unit(filesystem)
        };
        let from = loc!(Authoring, "storage", "filesystems", index);
        let to = loc!(Target, "systemd", "units", config.systemd.units.len());
        translations.add_from_common_source(&from, &to, &unit);
        config.systemd.units.push(unit);
    }
    if !config.systemd.is_empty() {
        let from = loc!(Authoring, "storage", "filesystems");
        translations.add_translation(from.clone(), loc!(Target, "systemd"));
        translations.add_translation(from, loc!(Target, "systemd", "units"));
    }
    (config, translations)
}

fn mount_unit(filesystem: &v0_6::Filesystem) -> wire::Unit {
    let path = filesystem.path.as_deref().unwrap_or_default();
    let device = escape_path(&filesystem.device);
    let mut contents = format!(
        "# Generated by Kindling\n\
         [Unit]\n\
         Requires=systemd-fsck@{device}.service\n\
         After=systemd-fsck@{device}.service\n\
         \n\
         [Mount]\n\
         Where={path}\n\
         What={}\n\
         Type={}\n",
        filesystem.device,
        filesystem.format.as_deref().unwrap_or_default(),
    );
    push_options(&mut contents, &filesystem.mount_options);
    contents.push_str("\n[Install]\nRequiredBy=local-fs.target\n");
    wire::Unit {
        contents: Some(contents),
        enabled: Some(true),
        name: format!("{}.mount", escape_path(path)),
        ..Default::default()
    }
}

fn swap_unit(filesystem: &v0_6::Filesystem) -> wire::Unit {
    let mut contents = format!(
        "# Generated by Kindling\n[Swap]\nWhat={}\n",
        filesystem.device
    );
    push_options(&mut contents, &filesystem.mount_options);
    contents.push_str("\n[Install]\nRequiredBy=swap.target\n");
    wire::Unit {
        contents: Some(contents),
        enabled: Some(true),
        name: format!("{}.swap", escape_path(&filesystem.device)),
        ..Default::default()
    }
}

fn push_options(contents: &mut String, options: &[String]) {
    if !options.is_empty() {
        contents.push_str(&format!("Options={}\n", options.join(",")));
    }
}

/// Escapes a path the way systemd does to form a unit name
///
/// ```
/// use kindling_schema::escape_path;
/// assert_eq!(escape_path("/var/lib/data"), "var-lib-data");
/// assert_eq!(escape_path("/"), "-");
/// assert_eq!(escape_path("/dev/disk/by-label/x"), "dev-disk-by\\x2dlabel-x");
/// ```
pub fn escape_path(path: &str) -> String {
    let trimmed: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    if trimmed.is_empty() {
        return "-".to_owned();
    }
    let mut escaped = String::new();
    for (index, byte) in trimmed.join("/").bytes().enumerate() {
        match byte {
            b'/' => escaped.push('-'),
            b'.' if index == 0 => escaped.push_str("\\x2e"),
            b if b.is_ascii_alphanumeric() || b == b':' || b == b'_' || b == b'.' => {
                escaped.push(b as char)
            }
            b => escaped.push_str(&format!("\\x{b:02x}")),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_follow_their_filesystems() {
        let filesystems = vec![
            v0_6::Filesystem {
                device: "/dev/vdb1".into(),
                ..Default::default()
            },
            v0_6::Filesystem {
                device: "/dev/vdb2".into(),
                format: Some("xfs".into()),
                path: Some("/var/srv".into()),
                mount_options: vec!["noatime".into(), "ro".into()],
                with_mount_unit: Some(true),
                ..Default::default()
            },
            v0_6::Filesystem {
                device: "/dev/vdb3".into(),
                format: Some("swap".into()),
                with_mount_unit: Some(true),
                ..Default::default()
            },
        ];
        let (config, translations) = mount_units(&filesystems);
        let units = &config.systemd.units;
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "var-srv.mount");
        assert_eq!(units[1].name, "dev-vdb3.swap");

        let contents = units[0].contents.as_deref().unwrap();
        assert!(contents.contains("Where=/var/srv\nWhat=/dev/vdb2\nType=xfs\nOptions=noatime,ro\n"));
        assert!(contents.contains("Requires=systemd-fsck@dev-vdb2.service"));

        assert_eq!(
            translations.find_source(&loc!(Target, "systemd", "units", 1, "name")),
            Some(loc!(Authoring, "storage", "filesystems", 2))
        );
    }
}
