use std::fmt::Display;

/// The document a [`Location`] points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Space {
    /// The versioned, human-authored config (written as YAML)
    Authoring,
    /// The fully expanded wire document (written as JSON)
    Target,
}

impl Display for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Space::Authoring => write!(f, "yaml"),
            Space::Target => write!(f, "json"),
        }
    }
}

/// A single step down into a document tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// A named field of a record
    Name(String),
    /// A position within a list
    Index(usize),
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Name(name) => write!(f, "{name}"),
            Step::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Step {
    fn from(name: &str) -> Self {
        Step::Name(name.to_owned())
    }
}

impl From<String> for Step {
    fn from(name: String) -> Self {
        Step::Name(name)
    }
}

impl From<&String> for Step {
    fn from(name: &String) -> Self {
        Step::Name(name.clone())
    }
}

impl From<usize> for Step {
    fn from(index: usize) -> Self {
        Step::Index(index)
    }
}

/// An addressable position within a document of a given [`Space`]
///
/// Two locations are equal only if both their space and every step match.
/// ```
/// use kindling_translate::{loc, Location, Space};
///
/// let disk = loc!(Target, "storage", "disks", 1);
/// assert_eq!(disk.to_string(), "$.storage.disks.1");
/// assert_eq!(disk.space(), Space::Target);
/// assert_ne!(disk, loc!(Authoring, "storage", "disks", 1));
/// assert!(disk.child("device").starts_with(&disk));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    space: Space,
    steps: Vec<Step>,
}

impl Location {
    /// The root of a document
    pub fn root(space: Space) -> Self {
        Location {
            space,
            steps: Vec::new(),
        }
    }

    /// Constructs a location from a sequence of steps
    pub fn new(space: Space, steps: Vec<Step>) -> Self {
        Location { space, steps }
    }

    /// The document this location points into
    pub fn space(&self) -> Space {
        self.space
    }

    /// The steps from the root of the document to this location
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns true if this is the root of its document
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Extends this location by one step, consuming it
    pub fn append(mut self, step: impl Into<Step>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// Returns a new location one step below this one
    pub fn child(&self, step: impl Into<Step>) -> Self {
        self.clone().append(step)
    }

    /// Returns a new location with the given steps added below this one
    pub fn join(&self, steps: &[Step]) -> Self {
        let mut joined = self.clone();
        joined.steps.extend_from_slice(steps);
        joined
    }

    /// Returns this location re-rooted below `prefix` (taking the prefix's space)
    pub fn prefixed(&self, prefix: &Location) -> Self {
        prefix.join(&self.steps)
    }

    /// The location one step up, if this is not the root
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.steps.split_last()?;
        Some(Location::new(self.space, parent.to_vec()))
    }

    /// Returns true if `prefix` is this location or one of its ancestors
    pub fn starts_with(&self, prefix: &Location) -> bool {
        self.space == prefix.space && self.steps.starts_with(&prefix.steps)
    }

    /// Returns the steps remaining below `prefix`, if this location lies within it
    pub fn strip_prefix(&self, prefix: &Location) -> Option<&[Step]> {
        if self.starts_with(prefix) {
            Some(&self.steps[prefix.steps.len()..])
        } else {
            None
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for step in &self.steps {
            write!(f, ".{step}")?;
        }
        Ok(())
    }
}

/// Builds a [`Location`] from a [`Space`] variant name and any number of steps
///
/// Steps may be field names (`&str`, `String`) or list indices (`usize`).
#[macro_export]
macro_rules! loc {
    ($space:ident $(, $step:expr)* $(,)?) => {
        $crate::Location::root($crate::Space::$space)$(.append($step))*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_and_prefix() {
        let location = loc!(Authoring, "boot_device", "mirror", "devices", 0);
        let parent = location.parent().unwrap();
        assert_eq!(parent, loc!(Authoring, "boot_device", "mirror", "devices"));
        assert_eq!(
            location.strip_prefix(&loc!(Authoring, "boot_device")),
            Some(&[Step::from("mirror"), Step::from("devices"), Step::from(0)][..])
        );
        assert_eq!(location.strip_prefix(&loc!(Target, "boot_device")), None);
        assert!(Location::root(Space::Target).parent().is_none());
    }

    #[test]
    fn prefixed_takes_prefix_space() {
        let relative = loc!(Authoring, "tang", 0, "url");
        let absolute = relative.prefixed(&loc!(Authoring, "boot_device", "luks"));
        assert_eq!(absolute.to_string(), "$.boot_device.luks.tang.0.url");
    }
}
