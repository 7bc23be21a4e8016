use std::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    fmt::Display,
};

use serde::Serialize;

use crate::{tree, Location, MergeError, Space, Step};

/// Records why each destination value exists: the source location(s) it was translated from
///
/// Provenance is kept alongside a document rather than inside it. Each destination location
/// has exactly one set of contributing sources; [merging](TranslationSet::merge) in a second,
/// different set for the same destination is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSet {
    from: Space,
    to: Space,
    set: BTreeMap<Location, BTreeSet<Location>>,
}

impl TranslationSet {
    /// An empty set of translations between the two spaces
    pub fn new(from: Space, to: Space) -> Self {
        TranslationSet {
            from,
            to,
            set: BTreeMap::new(),
        }
    }

    /// The space translations are recorded from
    pub fn from_space(&self) -> Space {
        self.from
    }

    /// The space translations are recorded into
    pub fn to_space(&self) -> Space {
        self.to
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// The number of destination locations with recorded sources
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Iterates over each destination and its sources, ordered by destination
    pub fn iter(&self) -> impl Iterator<Item = (&Location, &BTreeSet<Location>)> {
        self.set.iter()
    }

    /// The sources recorded for exactly this destination
    pub fn sources(&self, to: &Location) -> Option<&BTreeSet<Location>> {
        self.set.get(to)
    }

    /// Records that `from` contributed to `to`
    pub fn add_translation(&mut self, from: Location, to: Location) {
        debug_assert_eq!(from.space(), self.from, "translation source in wrong space");
        debug_assert_eq!(to.space(), self.to, "translation destination in wrong space");
        self.set.entry(to).or_default().insert(from);
    }

    /// Records that the whole of `value`, placed at `to`, was synthesized from `from`
    ///
    /// Every present node of `value` (and `to` itself) is attributed to the one source location,
    /// which is how a single declarative field expanding into a larger structure is tracked.
    pub fn add_from_common_source(&mut self, from: &Location, to: &Location, value: &impl Serialize) {
        self.add_translation(from.clone(), to.clone());
        for steps in tree::present_nodes(&tree::to_tree(value)) {
            self.add_translation(from.clone(), to.join(&steps));
        }
    }

    /// Records that `value` was copied wholesale from `from` to `to`, node for node
    pub fn add_from_common_object(&mut self, from: &Location, to: &Location, value: &impl Serialize) {
        for steps in tree::present_nodes(&tree::to_tree(value)) {
            self.add_translation(from.join(&steps), to.join(&steps));
        }
    }

    /// Moves every recorded location below the given prefixes
    pub fn prefixed(self, from: &[Step], to: &[Step]) -> Self {
        let from_prefix = Location::root(self.from).join(from);
        let to_prefix = Location::root(self.to).join(to);
        TranslationSet {
            from: self.from,
            to: self.to,
            set: self
                .set
                .into_iter()
                .map(|(dest, sources)| {
                    (
                        dest.prefixed(&to_prefix),
                        sources.into_iter().map(|s| s.prefixed(&from_prefix)).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Adds every translation from `other`, failing if any destination already has a different
    /// set of sources
    ///
    /// On failure, translations merged before the conflict remain.
    pub fn merge(&mut self, other: TranslationSet) -> Result<(), MergeError> {
        debug_assert_eq!((self.from, self.to), (other.from, other.to));
        for (dest, sources) in other.set {
            self.insert_exclusive(dest, sources)?;
        }
        Ok(())
    }

    pub(crate) fn insert_exclusive(
        &mut self,
        dest: Location,
        sources: BTreeSet<Location>,
    ) -> Result<(), MergeError> {
        match self.set.entry(dest) {
            Entry::Vacant(entry) => {
                entry.insert(sources);
                Ok(())
            }
            Entry::Occupied(entry) => {
                if *entry.get() == sources {
                    Ok(())
                } else {
                    Err(MergeError::Translation {
                        location: entry.key().clone(),
                    })
                }
            }
        }
    }

    pub(crate) fn insert_shared(&mut self, dest: Location, sources: BTreeSet<Location>) {
        self.set.entry(dest).or_default().extend(sources);
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (Location, BTreeSet<Location>)> {
        self.set.into_iter()
    }

    /// Finds where a destination came from, walking up to the nearest ancestor with a record
    ///
    /// Where several sources contributed, the first (in location order) is returned.
    pub fn find_source(&self, to: &Location) -> Option<Location> {
        let mut current = Some(to.clone());
        while let Some(location) = current {
            if let Some(source) = self.set.get(&location).and_then(|s| s.iter().next()) {
                return Some(source.clone());
            }
            current = location.parent();
        }
        None
    }

    /// Composes two consecutive translation steps into one
    ///
    /// Where `self` records `a -> b` and `next` records `b -> c`, the result records `a -> c`.
    /// A destination of `next` whose source has no record in `self` is attributed to the
    /// nearest recorded ancestor of that source.
    pub fn map(&self, next: &TranslationSet) -> TranslationSet {
        debug_assert_eq!(self.to, next.from);
        let mut composed = TranslationSet::new(self.from, next.to);
        for (dest, middles) in &next.set {
            for middle in middles {
                match self.set.get(middle) {
                    Some(origins) => {
                        for origin in origins {
                            composed.add_translation(origin.clone(), dest.clone());
                        }
                    }
                    None => {
                        if let Some(origin) = self.find_source(middle) {
                            composed.add_translation(origin, dest.clone());
                        }
                    }
                }
            }
        }
        composed
    }

    /// The translations whose destination lies within `to`
    pub fn descend(&self, to: &Location) -> TranslationSet {
        TranslationSet {
            from: self.from,
            to: self.to,
            set: self
                .set
                .iter()
                .filter(|(dest, _)| dest.starts_with(to))
                .map(|(dest, sources)| (dest.clone(), sources.clone()))
                .collect(),
        }
    }
}

impl Display for TranslationSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "from {} to {}", self.from, self.to)?;
        for (dest, sources) in &self.set {
            for source in sources {
                writeln!(f, "  {source} -> {dest}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::loc;

    #[test]
    fn common_source_covers_every_leaf() {
        let mut ts = TranslationSet::new(Space::Authoring, Space::Target);
        let from = loc!(Authoring, "boot_device", "mirror", "devices", 0);
        let to = loc!(Target, "storage", "disks", 0);
        ts.add_from_common_source(
            &from,
            &to,
            &json!({"device": "/dev/vda", "partitions": [{"label": "boot-1"}]}),
        );
        for dest in [
            to.clone(),
            to.child("device"),
            to.child("partitions"),
            to.child("partitions").append(0),
            to.child("partitions").append(0).append("label"),
        ] {
            assert_eq!(ts.sources(&dest), Some(&BTreeSet::from([from.clone()])));
        }
        assert_eq!(ts.len(), 5);
    }

    #[test]
    fn conflicting_sources_are_rejected() {
        let mut first = TranslationSet::new(Space::Authoring, Space::Target);
        first.add_translation(loc!(Authoring, "a"), loc!(Target, "x"));
        let mut same = TranslationSet::new(Space::Authoring, Space::Target);
        same.add_translation(loc!(Authoring, "a"), loc!(Target, "x"));
        let mut different = TranslationSet::new(Space::Authoring, Space::Target);
        different.add_translation(loc!(Authoring, "b"), loc!(Target, "x"));

        assert_eq!(first.merge(same), Ok(()));
        assert_eq!(
            first.merge(different),
            Err(MergeError::Translation {
                location: loc!(Target, "x")
            })
        );
    }

    #[test]
    fn map_composes_steps() {
        let mut step = TranslationSet::new(Space::Authoring, Space::Authoring);
        step.add_translation(loc!(Authoring, "raid", 0), loc!(Authoring, "raid", 0));
        step.add_translation(
            loc!(Authoring, "raid", 0, "options"),
            loc!(Authoring, "raid", 0, "options"),
        );
        let mut terminal = TranslationSet::new(Space::Authoring, Space::Target);
        terminal.add_translation(
            loc!(Authoring, "raid", 0, "options"),
            loc!(Target, "storage", "raid", 0, "options"),
        );
        terminal.add_translation(
            loc!(Authoring, "raid", 0, "options", 0),
            loc!(Target, "storage", "raid", 0, "options", 0),
        );
        let composed = step.map(&terminal);
        assert_eq!(composed.from_space(), Space::Authoring);
        assert_eq!(composed.to_space(), Space::Target);
        assert_eq!(
            composed.find_source(&loc!(Target, "storage", "raid", 0, "options", 0)),
            Some(loc!(Authoring, "raid", 0, "options"))
        );
    }

    #[test]
    fn prefixed_moves_both_sides() {
        let mut ts = TranslationSet::new(Space::Authoring, Space::Target);
        ts.add_translation(loc!(Authoring, "url"), loc!(Target, "url"));
        let ts = ts.prefixed(
            &[Step::from("tang"), Step::from(1)],
            &[Step::from("clevis"), Step::from("tang"), Step::from(1)],
        );
        assert_eq!(
            ts.find_source(&loc!(Target, "clevis", "tang", 1, "url")),
            Some(loc!(Authoring, "tang", 1, "url"))
        );
    }
}
