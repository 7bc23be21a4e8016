//! OS extensions, rendered as an rpm-ostree origin file

use kindling_config::TranslateOptions;
use kindling_schema::{encode_resource, wire};
use kindling_translate::{loc, Report, Space, Translated, TranslationSet};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::v1_6::Extension;

pub const ORIGIN_DIR: &str = "/etc/rpm-ostree/origin.d";

#[derive(Serialize)]
struct Origin<'a> {
    packages: Vec<&'a str>,
}

/// Renders the extensions as a partial document holding a single origin file
///
/// The file name carries a digest of its contents, so differing extension sets never collide.
pub fn render(extensions: &[Extension], options: &TranslateOptions) -> Translated<wire::Config> {
    let mut rendered = wire::Config::default();
    let mut translations = TranslationSet::new(Space::Authoring, Space::Target);
    let mut report = Report::new();
    if extensions.is_empty() {
        return Translated::new(rendered, translations, report);
    }
    let source = loc!(Authoring, "extensions");

    let origin = Origin {
        packages: extensions.iter().map(|e| e.name.as_str()).collect(),
    };
    let yaml = match serde_yaml::to_string(&origin) {
        Ok(yaml) => yaml,
        Err(e) => {
            report.add_error(source, e);
            return Translated::new(rendered, translations, report);
        }
    };
    let contents = format!("# Generated by Kindling\n\n{yaml}");
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
    let digest = hex::encode(Sha256::digest(encoded.url.as_bytes()));

    rendered.storage.files.push(wire::File {
        path: format!("{ORIGIN_DIR}/extensions-{}.yaml", &digest[..7]),
        mode: Some(0o644),
        contents: wire::Resource {
            source: Some(encoded.url),
            compression: Some(encoded.compression),
            ..Default::default()
        },
        ..Default::default()
    });
    translations.add_from_common_source(&source, &loc!(Target, "storage"), &rendered.storage);
    tracing::debug!("Rendered {} OS extensions", extensions.len());
    Translated::new(rendered, translations, report)
}

#[cfg(test)]
mod tests {
    use kindling_translate::loc;

    use super::*;

    fn extensions(names: &[&str]) -> Vec<Extension> {
        names
            .iter()
            .map(|name| Extension {
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn nothing_is_rendered_without_extensions() {
        let rendered = render(&[], &TranslateOptions::default());
        assert_eq!(rendered.value, wire::Config::default());
        assert!(rendered.translations.is_empty());
    }

    #[test]
    fn origin_file_lists_packages() {
        let options = TranslateOptions {
            no_resource_auto_compression: true,
            ..Default::default()
        };
        let rendered = render(&extensions(&["wireguard-tools", "strace"]), &options);
        let files = &rendered.value.storage.files;
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert!(file.path.starts_with("/etc/rpm-ostree/origin.d/extensions-"));
        assert!(file.path.ends_with(".yaml"));
        assert_eq!(file.path.len(), ORIGIN_DIR.len() + "/extensions-".len() + 7 + ".yaml".len());
        assert_eq!(file.mode, Some(0o644));
        let source = file.contents.source.as_deref().unwrap();
        assert!(source.starts_with("data:"));
        assert_eq!(file.contents.compression.as_deref(), Some(""));
        assert_eq!(
            rendered
                .translations
                .find_source(&loc!(Target, "storage", "files", 0, "path")),
            Some(loc!(Authoring, "extensions")),
        );
    }

    #[test]
    fn file_name_follows_contents() {
        let options = TranslateOptions::default();
        let first = render(&extensions(&["strace"]), &options);
        let again = render(&extensions(&["strace"]), &options);
        let other = render(&extensions(&["gdb"]), &options);
        let path = |rendered: &Translated<wire::Config>| rendered.value.storage.files[0].path.clone();
        assert_eq!(path(&first), path(&again));
        assert_ne!(path(&first), path(&other));
    }
}
