//! Checks shared between versions
//!
//! Locations in the returned reports are relative to the record that was checked.

use kindling_translate::{loc, Report};

/// Checks a filesystem's request for a generated mount unit
pub fn mount_unit(
    with_mount_unit: Option<bool>,
    format: Option<&str>,
    path: Option<&str>,
    swap_units: bool,
) -> Report {
    let mut report = Report::new();
    if with_mount_unit != Some(true) {
        return report;
    }
    match format {
        None | Some("") => {
            report.add_error(
                loc!(Authoring, "format"),
                "format is required if with_mount_unit is true",
            );
        }
        Some("swap") => {
            if !swap_units {
                report.add_error(
                    loc!(Authoring, "format"),
                    "swap mount units are not supported in this version",
                );
            }
        }
        Some(_) => {
            if path.unwrap_or_default().is_empty() {
                report.add_error(
                    loc!(Authoring, "path"),
                    "path is required if with_mount_unit is true",
                );
            }
        }
    }
    report
}

/// Checks that a resource names exactly one way to get at its content
pub fn resource(source: Option<&str>, inline: Option<&str>) -> Report {
    let mut report = Report::new();
    if source.is_some() && inline.is_some() {
        report.add_error(
            loc!(Authoring, "inline"),
            "source and inline are mutually exclusive",
        );
    }
    report
}
