use anyhow::Result;
use indoc::indoc;
use kindling_config::TranslateOptions;
use kindling_translate::{loc, Severity};

use crate::{v1_4, v1_5, v1_6};

#[test]
fn test_grub_users() -> Result<()> {
    assert_desugaring_of! {
        config: "
            version: 1.6.0-experimental
            variant: fcos
            grub:
              users:
                - name: root
                  password_hash: grub.pbkdf2.sha512.10000.ABCD
            "
        yields: r#"
            {
              "ignition": { "version": "3.5.0" },
              "storage": {
                "files": [
                  {
                    "append": [
                      {
                        "compression": "",
                        "source": "data:,%23%20Generated%20by%20Kindling%0A%0Aset%20superusers%3D%22root%22%0Apassword_pbkdf2%20root%20grub.pbkdf2.sha512.10000.ABCD%0A"
                      }
                    ],
                    "path": "/boot/grub2/user.cfg"
                  }
                ],
                "filesystems": [
                  { "device": "/dev/disk/by-label/boot", "format": "ext4", "path": "/boot" }
                ]
              }
            }
            "#
        provenance:
            ("storage", "files", 0, "append", 0, "source") <- ("grub", "users")
            ("storage", "filesystems", 0, "path") <- ("grub", "users")
    }
}

#[test]
fn test_extensions_become_an_origin_file() -> Result<()> {
    let config: v1_6::Config = serde_yaml::from_str(indoc!(
        "
        version: 1.6.0-experimental
        variant: fcos
        extensions:
          - name: wireguard-tools
        storage:
          files:
            - path: /etc/motd
              contents:
                inline: hello
        "
    ))?;
    assert!(config.validate().is_empty());
    let translated = config.to_wire(&TranslateOptions::default());
    let files = &translated.value.storage.files;
    assert_eq!(files.len(), 2);
    assert!(files[0].path.starts_with("/etc/rpm-ostree/origin.d/extensions-"));
    assert_eq!(files[1].path, "/etc/motd");
    assert_eq!(
        translated
            .translations
            .find_source(&loc!(Target, "storage", "files", 0, "contents", "source")),
        Some(loc!(Authoring, "extensions")),
    );
    assert_eq!(
        translated
            .translations
            .find_source(&loc!(Target, "storage", "files", 1, "path")),
        Some(loc!(Authoring, "storage", "files", 0, "path")),
    );
    Ok(())
}

#[test]
fn test_grub_and_mirror_both_mount_boot() -> Result<()> {
    let config: v1_6::Config = serde_yaml::from_str(indoc!(
        "
        version: 1.6.0-experimental
        variant: fcos
        boot_device:
          mirror:
            devices: [/dev/vda, /dev/vdb]
        grub:
          users:
            - name: root
              password_hash: grub.pbkdf2.sha512.10000.ABCD
        "
    ))?;
    let translated = config.to_wire(&TranslateOptions::default());
    assert!(translated.report.is_empty(), "{}", translated.report);
    let filesystems = &translated.value.storage.filesystems;
    // The GRUB filesystem is merged ahead of everything rendered before it
    assert_eq!(filesystems[0].device, "/dev/disk/by-label/boot");
    assert_eq!(filesystems.len(), 5);
    assert_eq!(filesystems[3].device, "/dev/md/md-boot");
    assert_eq!(
        translated
            .translations
            .find_source(&loc!(Target, "storage", "filesystems", 3, "device")),
        Some(loc!(Authoring, "boot_device", "mirror")),
    );
    Ok(())
}

#[test]
fn test_user_partitions_are_checked_after_desugaring() -> Result<()> {
    let config: v1_6::Config = serde_yaml::from_str(indoc!(
        "
        version: 1.6.0-experimental
        variant: fcos
        storage:
          disks:
            - device: /dev/vda
              partitions:
                - label: root
                  number: 4
                  size_mib: 4096
                - label: boot
                  number: 2
        boot_device:
          luks:
            tpm2: true
        "
    ))?;
    let translated = config.to_wire(&TranslateOptions::default());
    let warnings: Vec<_> = translated
        .report
        .entries()
        .iter()
        .filter(|entry| entry.severity == Severity::Warn)
        .map(|entry| entry.location.clone())
        .collect();
    assert_eq!(
        warnings,
        [
            Some(loc!(Target, "storage", "disks", 0, "partitions", 0, "sizeMiB")),
            Some(loc!(Target, "storage", "disks", 0, "partitions", 1, "label")),
        ]
    );
    Ok(())
}

#[test]
fn test_invalid_fcos_settings_are_reported() -> Result<()> {
    let config: v1_6::Config = serde_yaml::from_str(indoc!(
        "
        version: 1.6.0-experimental
        variant: fcos
        boot_device:
          layout: sparc
          mirror:
            devices: ['']
        grub:
          users:
            - name: root
        extensions:
          - name: ''
        "
    ))?;
    let report = config.validate();
    let locations: Vec<_> = report
        .entries()
        .iter()
        .map(|entry| entry.location.clone())
        .collect();
    assert_eq!(
        locations,
        [
            Some(loc!(Authoring, "boot_device", "layout")),
            Some(loc!(Authoring, "boot_device", "mirror", "devices", 0)),
            Some(loc!(Authoring, "grub", "users", 0, "password_hash")),
            Some(loc!(Authoring, "extensions", 0, "name")),
        ]
    );
    assert!(report.is_error());
    Ok(())
}

#[test]
fn test_older_versions_chain_to_the_same_document() -> Result<()> {
    let text = indoc!(
        "
        variant: fcos
        storage:
          luks:
            - name: data
              device: /dev/vdb
              clevis:
                tang:
                  - url: https://tang.example.com
        boot_device:
          layout: aarch64
          luks:
            tang:
              - url: https://tang.example.com
                thumbprint: abc
          mirror:
            devices: [/dev/vda]
        "
    );
    let options = TranslateOptions::default();
    let old: v1_4::Config = serde_yaml::from_str(&format!("version: {}\n{text}", v1_4::VERSION))?;
    let middle: v1_5::Config = serde_yaml::from_str(&format!("version: {}\n{text}", v1_5::VERSION))?;
    let new: v1_6::Config = serde_yaml::from_str(&format!("version: {}\n{text}", v1_6::VERSION))?;

    let old = old.to_wire(&options);
    let middle = middle.to_wire(&options);
    let new = new.to_wire(&options);
    assert_eq!(old.value, new.value);
    assert_eq!(middle.value, new.value);
    assert_eq!(old.report, new.report);

    for to in [
        loc!(Target, "storage", "luks", 0, "clevis", "tang", 0, "thumbprint"),
        loc!(Target, "storage", "luks", 1, "device"),
        loc!(Target, "storage", "disks", 0, "partitions", 1, "label"),
    ] {
        assert_eq!(
            old.translations.find_source(&to),
            new.translations.find_source(&to),
            "{to}"
        );
    }
    assert_eq!(
        old.translations
            .find_source(&loc!(Target, "storage", "luks", 0, "clevis", "tang", 0, "thumbprint")),
        Some(loc!(Authoring, "boot_device", "luks", "tang", 0, "thumbprint")),
    );
    Ok(())
}
