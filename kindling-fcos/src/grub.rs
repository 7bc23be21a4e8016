//! GRUB superusers, rendered into the bootloader's user config

use kindling_config::TranslateOptions;
use kindling_schema::{encode_resource, wire};
use kindling_translate::{loc, Report, Space, Translated, TranslationSet};

use crate::v1_6::Grub;

pub const USER_CFG: &str = "/boot/grub2/user.cfg";

/// Renders the superusers as a partial document mounting `/boot` and appending to its user config
pub fn render(grub: &Grub, options: &TranslateOptions) -> Translated<wire::Config> {
    let mut rendered = wire::Config::default();
    let mut translations = TranslationSet::new(Space::Authoring, Space::Target);
    let mut report = Report::new();
    if grub.users.is_empty() {
        return Translated::new(rendered, translations, report);
    }
    let source = loc!(Authoring, "grub", "users");

    let names: Vec<&str> = grub.users.iter().map(|user| user.name.as_str()).collect();
    let passwords: Vec<String> = grub
        .users
        .iter()
        .map(|user| {
            format!(
                "password_pbkdf2 {} {}",
                user.name,
                user.password_hash.as_deref().unwrap_or_default()
            )
        })
        .collect();
    let contents = format!(
        "# Generated by Kindling\n\nset superusers=\"{}\"\n{}\n",
        names.join(" "),
        passwords.join("\n"),
    );
    let encoded = match encode_resource(
        contents.as_bytes(),
        None,
        options.allow_auto_compression(),
    ) {
        Ok(encoded) => encoded,
        Err(e) => {
            report.add_error(source, e);
            return Translated::new(rendered, translations, report);
        }
    };

    rendered.storage.filesystems.push(wire::Filesystem {
        device: "/dev/disk/by-label/boot".to_owned(),
        format: Some("ext4".to_owned()),
        path: Some("/boot".to_owned()),
        ..Default::default()
    });
    rendered.storage.files.push(wire::File {
        path: USER_CFG.to_owned(),
        append: vec![wire::Resource {
            source: Some(encoded.url),
            compression: Some(encoded.compression),
            ..Default::default()
        }],
        ..Default::default()
    });
    translations.add_from_common_source(&source, &loc!(Target, "storage"), &rendered.storage);
    Translated::new(rendered, translations, report)
}

#[cfg(test)]
mod tests {
    use crate::v1_6::GrubUser;

    use super::*;

    #[test]
    fn superusers_are_appended_to_user_config() {
        let grub = Grub {
            users: vec![
                GrubUser {
                    name: "root".into(),
                    password_hash: Some("grub.pbkdf2.sha512.10000.AA".into()),
                },
                GrubUser {
                    name: "admin".into(),
                    password_hash: Some("grub.pbkdf2.sha512.10000.BB".into()),
                },
            ],
        };
        let options = TranslateOptions {
            no_resource_auto_compression: true,
            ..Default::default()
        };
        let rendered = render(&grub, &options);
        let storage = &rendered.value.storage;

        assert_eq!(storage.filesystems.len(), 1);
        assert_eq!(storage.filesystems[0].path.as_deref(), Some("/boot"));
        assert_eq!(storage.files[0].path, USER_CFG);

        let expected = encode_resource(
            b"# Generated by Kindling\n\n\
              set superusers=\"root admin\"\n\
              password_pbkdf2 root grub.pbkdf2.sha512.10000.AA\n\
              password_pbkdf2 admin grub.pbkdf2.sha512.10000.BB\n",
            None,
            false,
        )
        .unwrap();
        assert_eq!(storage.files[0].append[0].source, Some(expected.url));
        assert_eq!(
            rendered
                .translations
                .find_source(&loc!(Target, "storage", "filesystems", 0, "device")),
            Some(loc!(Authoring, "grub", "users")),
        );
    }

    #[test]
    fn nothing_is_rendered_without_users() {
        let rendered = render(&Grub::default(), &TranslateOptions::default());
        assert!(rendered.value.storage.files.is_empty());
        assert!(rendered.translations.is_empty());
    }
}
