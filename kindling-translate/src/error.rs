use thiserror::Error;

use crate::Location;

/// Failures combining independently built documents or translation sets
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// Both sides set the same scalar value
    #[error("conflicting values for {location}: {first} and {second}")]
    Value {
        /// Where the two documents disagree
        location: Location,
        /// The value from the first document
        first: String,
        /// The value from the second document
        second: String,
    },

    /// The two documents hold different kinds of value (e.g. a list and a record) at one place
    #[error("cannot merge a {first} with a {second} at {location}")]
    Shape {
        /// Where the two documents disagree
        location: Location,
        /// The kind of value in the first document
        first: &'static str,
        /// The kind of value in the second document
        second: &'static str,
    },

    /// A destination already has a different set of contributing sources
    #[error("{location} is already translated from a different source")]
    Translation {
        /// The destination both sets claim
        location: Location,
    },

    /// The merged tree no longer fits the document model
    #[error("merged document is malformed: {0}")]
    Document(String),
}

impl MergeError {
    /// The location the error refers to, if any
    pub fn location(&self) -> Option<&Location> {
        match self {
            MergeError::Value { location, .. }
            | MergeError::Shape { location, .. }
            | MergeError::Translation { location } => Some(location),
            MergeError::Document(_) => None,
        }
    }
}
