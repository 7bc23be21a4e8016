use std::fmt::Display;

use crate::{Location, TranslationSet};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Translation cannot continue; no document is produced
    Fatal,
    /// Translation completes but the overall operation fails
    Error,
    /// Informational; the operation still succeeds
    Warn,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Fatal => write!(f, "fatal"),
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warning"),
        }
    }
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// How serious this is
    pub severity: Severity,
    /// Where in which document it applies, if anywhere in particular
    pub location: Option<Location>,
    /// A human readable description
    pub message: String,
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {}: {}", self.severity, location, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// An ordered collection of diagnostics
///
/// Each translation stage returns its own report; callers merge child reports into their own
/// rather than stopping at the first problem.
/// ```
/// use kindling_translate::{loc, Report, Severity};
///
/// let mut report = Report::new();
/// report.add_warning(loc!(Authoring, "storage", "disks", 0), "looks odd");
///
/// let mut child = Report::new();
/// child.add_error(loc!(Authoring, "url"), "url is required");
/// report.merge(child.prefixed(&loc!(Authoring, "boot_device", "luks", "tang", 0)));
///
/// assert!(report.is_error());
/// assert!(!report.is_fatal());
/// assert_eq!(report.entries()[1].severity, Severity::Error);
/// assert_eq!(
///     report.entries()[1].to_string(),
///     "error at $.boot_device.luks.tang.0.url: url is required"
/// );
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    entries: Vec<Entry>,
}

impl Report {
    /// An empty report
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends a diagnostic
    pub fn add(&mut self, severity: Severity, location: Option<Location>, message: impl Display) {
        self.entries.push(Entry {
            severity,
            location,
            message: message.to_string(),
        });
    }

    /// Appends a fatal diagnostic at the given location
    pub fn add_fatal(&mut self, location: Location, message: impl Display) {
        self.add(Severity::Fatal, Some(location), message)
    }

    /// Appends an error at the given location
    pub fn add_error(&mut self, location: Location, message: impl Display) {
        self.add(Severity::Error, Some(location), message)
    }

    /// Appends a warning at the given location
    pub fn add_warning(&mut self, location: Location, message: impl Display) {
        self.add(Severity::Warn, Some(location), message)
    }

    /// Appends all of the entries of another report, after those already present
    pub fn merge(&mut self, other: Report) {
        self.entries.extend(other.entries);
    }

    /// All entries, in the order they were added
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns true if there are no diagnostics at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of entries with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    /// Returns true if any entry is fatal
    pub fn is_fatal(&self) -> bool {
        self.count(Severity::Fatal) > 0
    }

    /// Returns true if any entry is fatal or an error
    pub fn is_error(&self) -> bool {
        self.is_fatal() || self.count(Severity::Error) > 0
    }

    /// Returns true if the operation that produced this report must fail
    pub fn fails(&self, strict: bool) -> bool {
        self.is_error() || (strict && self.count(Severity::Warn) > 0)
    }

    /// Re-roots every entry of the prefix's space below `prefix`
    ///
    /// Sub-translations report relative to the value they were given; this places those
    /// entries within the enclosing document.
    pub fn prefixed(mut self, prefix: &Location) -> Self {
        for entry in self.entries.iter_mut() {
            if let Some(location) = &mut entry.location {
                if location.space() == prefix.space() {
                    *location = location.prefixed(prefix);
                }
            }
        }
        self
    }

    /// Rewrites entries located in the destination space of `translations` to the source
    /// location they were translated from
    ///
    /// Entries with no recorded provenance (even through an ancestor) are left untouched.
    pub fn correlate(&mut self, translations: &TranslationSet) {
        for entry in self.entries.iter_mut() {
            let Some(location) = &entry.location else {
                continue;
            };
            if location.space() != translations.to_space() {
                continue;
            }
            if let Some(source) = translations.find_source(location) {
                tracing::trace!("Correlated {} to {}", location, source);
                entry.location = Some(source);
            }
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{loc, Space};

    #[test]
    fn strict_fails_on_warnings() {
        let mut report = Report::new();
        report.add_warning(loc!(Authoring, "x"), "careful");
        assert!(!report.fails(false));
        assert!(report.fails(true));
    }

    #[test]
    fn prefix_only_touches_matching_space() {
        let mut report = Report::new();
        report.add_error(loc!(Authoring, "a"), "one");
        report.add_error(loc!(Target, "b"), "two");
        report.add(Severity::Warn, None, "three");
        let report = report.prefixed(&loc!(Authoring, "outer"));
        assert_eq!(report.entries()[0].location, Some(loc!(Authoring, "outer", "a")));
        assert_eq!(report.entries()[1].location, Some(loc!(Target, "b")));
        assert_eq!(report.entries()[2].location, None);
    }

    #[test]
    fn correlate_walks_up_to_nearest_translated_ancestor() {
        let mut translations = TranslationSet::new(Space::Authoring, Space::Target);
        translations.add_translation(
            loc!(Authoring, "boot_device", "mirror"),
            loc!(Target, "storage", "raid"),
        );
        let mut report = Report::new();
        report.add_warning(loc!(Target, "storage", "raid", 0, "name"), "odd name");
        report.add_warning(loc!(Target, "systemd"), "untracked");
        report.correlate(&translations);
        assert_eq!(
            report.entries()[0].location,
            Some(loc!(Authoring, "boot_device", "mirror"))
        );
        assert_eq!(report.entries()[1].location, Some(loc!(Target, "systemd")));
    }
}
