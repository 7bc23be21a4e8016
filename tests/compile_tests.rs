use indoc::indoc;
use kindling::{compile, CompileError, Severity, TranslateOptions};
use kindling_translate::loc;
use serde_json::json;

fn parse(text: &str) -> serde_yaml::Value {
    serde_yaml::from_str(text).unwrap()
}

fn locations(report: &kindling::Report) -> Vec<String> {
    report
        .entries()
        .iter()
        .map(|entry| format!("{:?} {}", entry.severity, entry.location.as_ref().unwrap()))
        .collect()
}

#[test]
fn luks_without_mirror_compiles_to_wire_json() {
    let input = parse(indoc!(
        "
        variant: fcos
        version: 1.6.0-experimental
        boot_device:
          luks:
            discard: true
            tang:
              - url: https://tang.example.com
                thumbprint: abc
        "
    ));
    let output = compile(&input, &TranslateOptions::default()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output.to_json(false).unwrap()).unwrap();
    assert_eq!(
        json,
        json!({
            "ignition": { "version": "3.5.0" },
            "storage": {
                "filesystems": [{
                    "device": "/dev/mapper/root",
                    "format": "xfs",
                    "label": "root",
                    "wipeFilesystem": true
                }],
                "luks": [{
                    "clevis": {
                        "tang": [{ "thumbprint": "abc", "url": "https://tang.example.com" }]
                    },
                    "device": "/dev/disk/by-partlabel/root",
                    "discard": true,
                    "label": "luks-root",
                    "name": "root",
                    "wipeVolume": true
                }]
            }
        })
    );
    assert!(output.report.is_empty());
}

#[test]
fn older_versions_compile_like_the_newest() {
    let body = indoc!(
        "
        variant: fcos
        passwd:
          users:
            - name: core
              ssh_authorized_keys: [ssh-ed25519 AAAA]
        storage:
          files:
            - path: /etc/hostname
              mode: 420
              contents:
                inline: node1
          luks:
            - name: data
              device: /dev/vdc
              clevis:
                tpm2: true
        boot_device:
          luks:
            tpm2: true
          mirror:
            devices: [/dev/vda, /dev/vdb]
        "
    );
    let options = TranslateOptions::default();
    let compile_as = |version: &str| {
        compile(&parse(&format!("version: {version}\n{body}")), &options).unwrap()
    };
    let newest = compile_as("1.6.0-experimental");
    for version in ["1.4.0", "1.5.0"] {
        let older = compile_as(version);
        assert_eq!(older.config, newest.config, "{version}");
        assert_eq!(older.translations, newest.translations, "{version}");
        assert_eq!(older.report, newest.report, "{version}");
    }
    assert_eq!(
        newest
            .translations
            .find_source(&loc!(Target, "storage", "files", 0, "contents", "source")),
        Some(loc!(Authoring, "storage", "files", 0, "contents", "inline")),
    );
    assert_eq!(
        newest
            .translations
            .find_source(&loc!(Target, "storage", "luks", 1, "clevis", "tpm2")),
        Some(loc!(Authoring, "storage", "luks", 0, "clevis", "tpm2")),
    );
    assert!(newest
        .translations
        .sources(&loc!(Target, "storage", "luks", 1, "cex"))
        .is_none());
}

#[test]
fn unsupported_version_is_fatal() {
    for text in [
        "variant: fcos\nversion: 1.3.0\n",
        "variant: fcos\n",
        "variant: rhcos\nversion: 1.4.0\n",
    ] {
        match compile(&parse(text), &TranslateOptions::default()) {
            Err(CompileError::Fatal(report)) => {
                assert_eq!(locations(&report), ["Fatal $.version"], "{text}");
            }
            other => panic!("expected fatal for {text:?}, got {other:?}"),
        }
    }
}

#[test]
fn mistyped_field_is_fatal() {
    let input = parse(indoc!(
        "
        variant: fcos
        version: 1.5.0
        boot_device:
          mirror:
            devices: /dev/vda
        "
    ));
    let error = compile(&input, &TranslateOptions::default()).unwrap_err();
    assert!(matches!(error, CompileError::Fatal(_)));
    assert!(error.report().is_fatal());
}

#[test]
fn every_validation_error_is_reported() {
    let input = parse(indoc!(
        "
        variant: fcos
        version: 1.5.0
        boot_device:
          layout: mips
          luks:
            tang:
              - thumbprint: abc
        "
    ));
    let error = compile(&input, &TranslateOptions::default()).unwrap_err();
    assert!(matches!(error, CompileError::Invalid(_)));
    assert_eq!(
        locations(error.report()),
        [
            "Error $.boot_device.layout",
            "Error $.boot_device.luks.tang.0.url",
        ]
    );
}

#[test]
fn resource_with_two_sources_is_invalid() {
    let input = parse(indoc!(
        "
        variant: fcos
        version: 1.5.0
        storage:
          files:
            - path: /etc/motd
              contents:
                source: https://example.com/motd
                inline: hello
        "
    ));
    let error = compile(&input, &TranslateOptions::default()).unwrap_err();
    assert!(matches!(error, CompileError::Invalid(_)));
    assert_eq!(
        locations(error.report()),
        ["Error $.storage.files.0.contents.inline"]
    );
}

#[test]
fn unused_keys_warn_and_fail_strict_compiles() {
    let input = parse(indoc!(
        "
        variant: fcos
        version: 1.4.0
        boot_device:
          mirrors:
            devices: [/dev/vda]
        "
    ));
    let output = compile(&input, &TranslateOptions::default()).unwrap();
    assert_eq!(locations(&output.report), ["Warn $.boot_device.mirrors"]);
    assert!(output.config.storage.disks.is_empty());

    let strict = TranslateOptions {
        strict: true,
        ..Default::default()
    };
    let error = compile(&input, &strict).unwrap_err();
    assert!(matches!(error, CompileError::Strict(_)));
    assert_eq!(error.report().count(Severity::Warn), 1);
}

#[test]
fn partition_warnings_point_at_the_config() {
    let input = parse(indoc!(
        "
        variant: fcos
        version: 1.6.0-experimental
        storage:
          disks:
            - device: /dev/vda
              partitions:
                - label: EFI-SYSTEM
                  number: 3
                - label: root
                  number: 4
                  size_mib: 4096
                  resize: true
            - device: /dev/vdb
              partitions:
                - label: root
                  number: 4
                  size_mib: 16384
        "
    ));
    let output = compile(&input, &TranslateOptions::default()).unwrap();
    assert_eq!(
        locations(&output.report),
        [
            "Warn $.storage.disks.0.partitions.0.label",
            "Warn $.storage.disks.0.partitions.1.size_mib",
        ]
    );
}

#[test]
fn mount_units_follow_user_units() {
    let input = parse(indoc!(
        "
        variant: fcos
        version: 1.6.0-experimental
        systemd:
          units:
            - name: hello.service
              enabled: true
        storage:
          filesystems:
            - device: /dev/disk/by-label/data
              format: xfs
              path: /var/data
              with_mount_unit: true
        "
    ));
    let output = compile(&input, &TranslateOptions::default()).unwrap();
    let names: Vec<_> = output
        .config
        .systemd
        .units
        .iter()
        .map(|unit| unit.name.as_str())
        .collect();
    assert_eq!(names, ["hello.service", "var-data.mount"]);
    assert_eq!(
        output
            .translations
            .find_source(&loc!(Target, "systemd", "units", 1, "contents")),
        Some(loc!(Authoring, "storage", "filesystems", 0)),
    );
    assert_eq!(output.config.storage.filesystems[0].path.as_deref(), Some("/var/data"));
}
