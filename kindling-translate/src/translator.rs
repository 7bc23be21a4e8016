use kindling_config::TranslateOptions;
use serde::{de::DeserializeOwned, Serialize};

use crate::{tree, Location, Report, Space, Step, TranslationSet};

/// A translated value together with its provenance and diagnostics
///
/// All locations are relative to the value that was translated.
#[derive(Debug, Clone)]
pub struct Translated<T> {
    /// The translated value
    pub value: T,
    /// Where each part of the value came from
    pub translations: TranslationSet,
    /// Anything noticed along the way
    pub report: Report,
}

impl<T> Translated<T> {
    /// Bundles a value with its provenance and diagnostics
    pub fn new(value: T, translations: TranslationSet, report: Report) -> Self {
        Translated {
            value,
            translations,
            report,
        }
    }

    /// Splits into its parts
    pub fn into_parts(self) -> (T, TranslationSet, Report) {
        (self.value, self.translations, self.report)
    }
}

/// Conversion of one document model into another, recording provenance
pub trait Translate<T> {
    /// Translates `self`, with all recorded locations relative to `self`
    fn translate(&self, tr: &Translator) -> Translated<T>;
}

/// Unchanged types translate to themselves, node for node
impl<T: Clone + Serialize> Translate<T> for T {
    fn translate(&self, tr: &Translator) -> Translated<T> {
        let mut translations = tr.empty_set();
        translations.add_from_common_object(
            &Location::root(tr.from),
            &Location::root(tr.to),
            self,
        );
        Translated::new(self.clone(), translations, Report::new())
    }
}

/// Renames a record field as it crosses from one model to the other
pub type KeyRename = fn(&str) -> String;

/// Keeps field names as they are
pub fn same_name(name: &str) -> String {
    name.to_owned()
}

/// The fixed parameters of a translation between two spaces
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    from: Space,
    to: Space,
    rename: KeyRename,
    options: TranslateOptions,
}

impl Translator {
    /// A translator that keeps field names as they are
    pub fn new(from: Space, to: Space, options: TranslateOptions) -> Self {
        Translator {
            from,
            to,
            rename: same_name,
            options,
        }
    }

    /// Uses the given function to name fields in the destination
    pub fn with_rename(mut self, rename: KeyRename) -> Self {
        self.rename = rename;
        self
    }

    /// The options in effect
    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// The destination name of a source field
    pub fn rename(&self, name: &str) -> String {
        (self.rename)(name)
    }

    /// An empty set of translations between this translator's spaces
    pub fn empty_set(&self) -> TranslationSet {
        TranslationSet::new(self.from, self.to)
    }

    /// The root of the source document
    pub fn source_root(&self) -> Location {
        Location::root(self.from)
    }

    /// The root of the destination document
    pub fn dest_root(&self) -> Location {
        Location::root(self.to)
    }

    /// Converts a value into a model of the same shape, once field names are renamed
    ///
    /// Every present node is recorded as translating to its renamed counterpart. An absent value
    /// converts to the default. Nodes with no place in the destination model are a defect in the
    /// models, reported as an error rather than a panic.
    pub fn recast<F, T>(&self, from: &F) -> Translated<T>
    where
        F: Serialize,
        T: DeserializeOwned + Default,
    {
        let mut translations = self.empty_set();
        let mut report = Report::new();
        let source = tree::to_tree(from);
        if tree::is_absent(&source) {
            return Translated::new(T::default(), translations, report);
        }
        let rename = self.rename;
        let value = match serde_json::from_value(tree::rename_keys(source.clone(), &rename)) {
            Ok(value) => value,
            Err(e) => {
                report.add_error(
                    self.source_root(),
                    format!("cannot be represented in the output: {e}"),
                );
                return Translated::new(T::default(), translations, report);
            }
        };
        let (from_root, to_root) = (self.source_root(), self.dest_root());
        tree::walk_present(&source, &rename, &mut |from_steps, to_steps| {
            translations.add_translation(from_root.join(from_steps), to_root.join(to_steps))
        });
        Translated::new(value, translations, report)
    }

    /// Begins accumulating the translation of one record
    pub fn session(&self) -> Session<'_> {
        Session {
            tr: self,
            translations: self.empty_set(),
            report: Report::new(),
        }
    }
}

/// Accumulates the field-by-field translation of a single record
///
/// ```
/// use kindling_config::TranslateOptions;
/// use kindling_translate::{loc, Space, Translator};
///
/// let tr = Translator::new(Space::Authoring, Space::Target, TranslateOptions::default());
/// let mut session = tr.session();
/// let (threshold, tpm2): (Option<i64>, Option<bool>) = (Some(2), None);
/// let (mut to_threshold, mut to_tpm2) = (None, None);
/// session.merge_field("threshold", &threshold, &mut to_threshold);
/// session.merge_field("tpm2", &tpm2, &mut to_tpm2);
/// let translated = session.finish(());
///
/// assert_eq!((to_threshold, to_tpm2), (Some(2), None));
/// assert!(translated.translations.sources(&loc!(Target, "threshold")).is_some());
/// assert!(translated.translations.sources(&loc!(Target, "tpm2")).is_none());
/// ```
pub struct Session<'t> {
    tr: &'t Translator,
    translations: TranslationSet,
    report: Report,
}

impl<'t> Session<'t> {
    /// The translator this session belongs to
    pub fn translator(&self) -> &'t Translator {
        self.tr
    }

    /// The options in effect
    pub fn options(&self) -> &'t TranslateOptions {
        &self.tr.options
    }

    /// Direct access to the diagnostics gathered so far
    pub fn report_mut(&mut self) -> &mut Report {
        &mut self.report
    }

    /// Direct access to the translations recorded so far
    pub fn translations_mut(&mut self) -> &mut TranslationSet {
        &mut self.translations
    }

    /// Records that the source field `from` produced the destination field `to`
    pub fn add_translation(&mut self, from: &[Step], to: &[Step]) {
        self.translations
            .add_translation(self.tr.source_root().join(from), self.tr.dest_root().join(to));
    }

    /// Copies an optional field if (and only if) it was set, recording where it came from
    pub fn merge_field<T: Clone>(&mut self, name: &str, from: &Option<T>, to: &mut Option<T>) {
        let to_name = self.tr.rename(name);
        self.merge_field_as(name, from, &to_name, to)
    }

    /// Like [`merge_field`](Self::merge_field), for a field that changes name explicitly
    pub fn merge_field_as<T: Clone>(
        &mut self,
        from_name: &str,
        from: &Option<T>,
        to_name: &str,
        to: &mut Option<T>,
    ) {
        if let Some(value) = from {
            *to = Some(value.clone());
            self.add_translation(&[Step::from(from_name)], &[Step::from(to_name)]);
        }
    }

    /// Translates a nested record, folding its provenance and diagnostics in below `name`
    pub fn translate<F, T>(&mut self, name: &str, from: &F, to: &mut T)
    where
        F: Translate<T>,
    {
        let to_name = self.tr.rename(name);
        let translated = from.translate(self.tr);
        *to = translated.value;
        self.absorb(
            &[Step::from(name)],
            &[Step::Name(to_name)],
            translated.translations,
            translated.report,
        );
    }

    /// Translates a record whose fields sit directly in the enclosing record
    pub fn flatten<F, T>(&mut self, from: &F, to: &mut T)
    where
        F: Translate<T>,
    {
        let translated = from.translate(self.tr);
        *to = translated.value;
        self.absorb(&[], &[], translated.translations, translated.report);
    }

    /// Translates each element of a list pairwise by position
    ///
    /// Each element's locations are prefixed with its index, and the whole list is recorded
    /// as translating to the whole destination list. A problem with one element does not stop
    /// its siblings from being translated.
    pub fn prefixed<F, T>(&mut self, name: &str, from: &[F], to: &mut Vec<T>)
    where
        F: Translate<T>,
    {
        if from.is_empty() {
            return;
        }
        let to_name = self.tr.rename(name);
        to.clear();
        for (index, element) in from.iter().enumerate() {
            let translated = element.translate(self.tr);
            to.push(translated.value);
            self.absorb(
                &[Step::from(name), Step::Index(index)],
                &[Step::Name(to_name.clone()), Step::Index(index)],
                translated.translations,
                translated.report,
            );
        }
        self.add_translation(&[Step::from(name)], &[Step::Name(to_name)]);
    }

    /// Copies a field between two models whose shapes agree once field names are renamed
    ///
    /// See [`Translator::recast`].
    pub fn auto<F, T>(&mut self, name: &str, from: &F, to: &mut T)
    where
        F: Serialize,
        T: DeserializeOwned + Default,
    {
        let to_name = self.tr.rename(name);
        let translated = self.tr.recast(from);
        *to = translated.value;
        self.absorb(
            &[Step::from(name)],
            &[Step::Name(to_name)],
            translated.translations,
            translated.report,
        );
    }

    fn absorb(&mut self, from: &[Step], to: &[Step], translations: TranslationSet, report: Report) {
        if let Err(e) = self.translations.merge(translations.prefixed(from, to)) {
            // Sibling fields never share destinations unless a model is defective
            self.report.add_fatal(self.tr.source_root().join(from), e);
        }
        let mut report = report.prefixed(&self.tr.source_root().join(from));
        if self.tr.to != self.tr.from {
            report = report.prefixed(&self.tr.dest_root().join(to));
        }
        self.report.merge(report);
    }

    /// Ends the session, attaching the accumulated provenance and diagnostics to `value`
    ///
    /// Unless nothing at all was translated, the record itself is recorded as translating to
    /// its destination.
    pub fn finish<T>(mut self, value: T) -> Translated<T> {
        if !self.translations.is_empty() {
            self.add_translation(&[], &[]);
        }
        Translated::new(value, self.translations, self.report)
    }
}
