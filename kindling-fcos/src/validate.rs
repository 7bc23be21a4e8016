use kindling_translate::{loc, Report};

use crate::v1_5::GrubUser;
use crate::v1_6::Extension;

/// The boot device layouts with a known partition template
pub const LAYOUTS: [&str; 3] = ["x86_64", "aarch64", "ppc64le"];

pub fn boot_device<'a>(
    layout: Option<&str>,
    mirror_devices: &[String],
    tang_urls: impl Iterator<Item = &'a str>,
) -> Report {
    let mut report = Report::new();
    let root = loc!(Authoring, "boot_device");
    if let Some(layout) = layout {
        if !LAYOUTS.contains(&layout) {
            report.add_error(
                root.child("layout"),
                format!("unknown layout {layout:?}; expected one of {}", LAYOUTS.join(", ")),
            );
        }
    }
    for (index, device) in mirror_devices.iter().enumerate() {
        if device.is_empty() {
            report.add_error(
                root.child("mirror").append("devices").append(index),
                "mirror device path is empty",
            );
        }
    }
    for (index, url) in tang_urls.enumerate() {
        if url.is_empty() {
            report.add_error(
                root.child("luks").append("tang").append(index).append("url"),
                "url is required",
            );
        }
    }
    report
}

pub fn grub_users(users: &[GrubUser]) -> Report {
    let mut report = Report::new();
    for (index, user) in users.iter().enumerate() {
        let at = loc!(Authoring, "grub", "users", index);
        if user.name.is_empty() {
            report.add_error(at.child("name"), "user name is required");
        }
        if user.password_hash.as_deref().unwrap_or_default().is_empty() {
            report.add_error(at.child("password_hash"), "password hash is required");
        }
    }
    report
}

pub fn extensions(extensions: &[Extension]) -> Report {
    let mut report = Report::new();
    for (index, extension) in extensions.iter().enumerate() {
        if extension.name.is_empty() {
            report.add_error(
                loc!(Authoring, "extensions", index, "name"),
                "extension name is required",
            );
        }
    }
    report
}
