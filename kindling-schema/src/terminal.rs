//! Translation of the newest base version into the wire format
//!
//! Most records have the same shape on both sides once field names are camelCased, and are
//! [recast](kindling_translate::Translator::recast) wholesale. Records carrying fields that
//! exist only for authoring (inline resources, mount unit requests) are translated field by
//! field.

use kindling_config::TranslateOptions;
use kindling_translate::{
    loc, merge_translated, Location, Space, Step, Translate, Translated, Translator,
};

use crate::{encode_resource, units, v0_4, v0_6, validate, wire};

/// Translates a config into the wire format, adding any requested mount units
pub fn to_wire(config: &v0_6::Config, options: &TranslateOptions) -> Translated<wire::Config> {
    let tr = Translator::new(Space::Authoring, Space::Target, *options).with_rename(wire::wire_name);
    let (out, translations, mut report) = config.translate(&tr).into_parts();

    let (mounts, mount_translations) = units::mount_units(&config.storage.filesystems);
    if mounts.systemd.is_empty() {
        return Translated::new(out, translations, report);
    }
    tracing::debug!("Adding {} mount unit(s)", mounts.systemd.units.len());
    match merge_translated(&out, &translations, &mounts, &mount_translations) {
        Ok((merged, translations)) => Translated::new(merged, translations, report),
        Err(e) => {
            let location = e
                .location()
                .cloned()
                .unwrap_or_else(|| Location::root(Space::Target));
            report.add_fatal(location, e);
            Translated::new(out, translations, report)
        }
    }
}

impl Translate<wire::Config> for v0_6::Config {
    fn translate(&self, tr: &Translator) -> Translated<wire::Config> {
        let mut session = tr.session();
        let mut out = wire::Config::default();
        session.translate("ignition", &self.ignition, &mut out.ignition);
        out.ignition.version = wire::VERSION.to_owned();
        session.add_translation(&[Step::from("version")], &[Step::from("ignition")]);
        session.add_translation(
            &[Step::from("version")],
            &[Step::from("ignition"), Step::from("version")],
        );
        session.auto(
            "kernel_arguments",
            &self.kernel_arguments,
            &mut out.kernel_arguments,
        );
        session.auto("passwd", &self.passwd, &mut out.passwd);
        session.translate("storage", &self.storage, &mut out.storage);
        session.auto("systemd", &self.systemd, &mut out.systemd);
        session.finish(out)
    }
}

impl Translate<wire::Ignition> for v0_4::Ignition {
    fn translate(&self, tr: &Translator) -> Translated<wire::Ignition> {
        let mut session = tr.session();
        let mut out = wire::Ignition::default();
        session.translate("config", &self.config, &mut out.config);
        session.auto("proxy", &self.proxy, &mut out.proxy);
        session.translate("security", &self.security, &mut out.security);
        session.auto("timeouts", &self.timeouts, &mut out.timeouts);
        session.finish(out)
    }
}

impl Translate<wire::IgnitionConfig> for v0_4::IgnitionConfig {
    fn translate(&self, tr: &Translator) -> Translated<wire::IgnitionConfig> {
        let mut session = tr.session();
        let mut out = wire::IgnitionConfig::default();
        session.prefixed("merge", &self.merge, &mut out.merge);
        session.translate("replace", &self.replace, &mut out.replace);
        session.finish(out)
    }
}

impl Translate<wire::Security> for v0_4::Security {
    fn translate(&self, tr: &Translator) -> Translated<wire::Security> {
        let mut session = tr.session();
        let mut out = wire::Security::default();
        session.translate("tls", &self.tls, &mut out.tls);
        session.finish(out)
    }
}

impl Translate<wire::Tls> for v0_4::Tls {
    fn translate(&self, tr: &Translator) -> Translated<wire::Tls> {
        let mut session = tr.session();
        let mut out = wire::Tls::default();
        session.prefixed(
            "certificate_authorities",
            &self.certificate_authorities,
            &mut out.certificate_authorities,
        );
        session.finish(out)
    }
}

impl Translate<wire::Resource> for v0_4::Resource {
    fn translate(&self, tr: &Translator) -> Translated<wire::Resource> {
        let mut session = tr.session();
        let mut out = wire::Resource::default();
        session.report_mut().merge(validate::resource(
            self.source.as_deref(),
            self.inline.as_deref(),
        ));
        session.merge_field("compression", &self.compression, &mut out.compression);
        session.auto("http_headers", &self.http_headers, &mut out.http_headers);
        session.merge_field("source", &self.source, &mut out.source);
        if let (Some(inline), None) = (&self.inline, &self.source) {
            match encode_resource(
                inline.as_bytes(),
                self.compression.as_deref(),
                tr.options().allow_auto_compression(),
            ) {
                Ok(encoded) => {
                    out.source = Some(encoded.url);
                    session.add_translation(&[Step::from("inline")], &[Step::from("source")]);
                    if self.compression.is_none() {
                        // Set explicitly so a merged parent config's compression does not apply
                        out.compression = Some(encoded.compression);
                        session.add_translation(
                            &[Step::from("inline")],
                            &[Step::from("compression")],
                        );
                    }
                }
                Err(e) => session.report_mut().add_error(loc!(Authoring, "inline"), e),
            }
        }
        session.auto("verification", &self.verification, &mut out.verification);
        session.finish(out)
    }
}

impl Translate<wire::Storage> for v0_6::Storage {
    fn translate(&self, tr: &Translator) -> Translated<wire::Storage> {
        let mut session = tr.session();
        let mut out = wire::Storage::default();
        session.auto("directories", &self.directories, &mut out.directories);
        session.auto("disks", &self.disks, &mut out.disks);
        session.prefixed("files", &self.files, &mut out.files);
        session.prefixed("filesystems", &self.filesystems, &mut out.filesystems);
        session.auto("links", &self.links, &mut out.links);
        session.prefixed("luks", &self.luks, &mut out.luks);
        session.auto("raid", &self.raid, &mut out.raid);
        session.finish(out)
    }
}

impl Translate<wire::File> for v0_4::File {
    fn translate(&self, tr: &Translator) -> Translated<wire::File> {
        let mut session = tr.session();
        let mut out = wire::File::default();
        session.prefixed("append", &self.append, &mut out.append);
        session.translate("contents", &self.contents, &mut out.contents);
        session.auto("group", &self.group, &mut out.group);
        session.merge_field("mode", &self.mode, &mut out.mode);
        session.merge_field("overwrite", &self.overwrite, &mut out.overwrite);
        session.translate("path", &self.path, &mut out.path);
        session.auto("user", &self.user, &mut out.user);
        session.finish(out)
    }
}

impl Translate<wire::Filesystem> for v0_6::Filesystem {
    fn translate(&self, tr: &Translator) -> Translated<wire::Filesystem> {
        let mut session = tr.session();
        let mut out = wire::Filesystem::default();
        session.translate("device", &self.device, &mut out.device);
        session.merge_field("format", &self.format, &mut out.format);
        session.merge_field("label", &self.label, &mut out.label);
        session.auto("mount_options", &self.mount_options, &mut out.mount_options);
        session.auto("options", &self.options, &mut out.options);
        session.merge_field("path", &self.path, &mut out.path);
        session.merge_field("uuid", &self.uuid, &mut out.uuid);
        session.merge_field(
            "wipe_filesystem",
            &self.wipe_filesystem,
            &mut out.wipe_filesystem,
        );
        session.finish(out)
    }
}

impl Translate<wire::Luks> for v0_6::Luks {
    fn translate(&self, tr: &Translator) -> Translated<wire::Luks> {
        let mut session = tr.session();
        let mut out = wire::Luks::default();
        session.auto("cex", &self.cex, &mut out.cex);
        session.auto("clevis", &self.clevis, &mut out.clevis);
        session.merge_field("device", &self.device, &mut out.device);
        session.merge_field("discard", &self.discard, &mut out.discard);
        session.translate("key_file", &self.key_file, &mut out.key_file);
        session.merge_field("label", &self.label, &mut out.label);
        session.translate("name", &self.name, &mut out.name);
        session.auto("open_options", &self.open_options, &mut out.open_options);
        session.auto("options", &self.options, &mut out.options);
        session.merge_field("uuid", &self.uuid, &mut out.uuid);
        session.merge_field("wipe_volume", &self.wipe_volume, &mut out.wipe_volume);
        session.finish(out)
    }
}
