//! Combining independently built documents
//!
//! Post-passes each build a partial document with its own [`TranslationSet`]; these are folded
//! into the main document one at a time with [`merge_translated`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{tree, Location, MergeError, Space, Step, TranslationSet};

/// Where nodes of the second document ended up in the merged one, and which nodes both
/// documents had
#[derive(Debug, Default)]
struct Transcript {
    /// Elements of the second document's lists, by their old and new steps
    moved: BTreeMap<Vec<Step>, Vec<Step>>,
    /// Nodes both documents held, whose provenance is the union of both sides
    shared: BTreeSet<Vec<Step>>,
}

impl Transcript {
    /// The merged location of a node of the second document
    fn remap(&self, steps: &[Step]) -> Vec<Step> {
        // Longest moved prefix wins; a list inside a moved element moves with it
        for split in (1..=steps.len()).rev() {
            if let Some(moved) = self.moved.get(&steps[..split]) {
                let mut remapped = moved.clone();
                remapped.extend_from_slice(&steps[split..]);
                return remapped;
            }
        }
        steps.to_vec()
    }
}

fn is_container(value: &Value) -> bool {
    value.is_array() || value.is_object()
}

fn merge_values(
    first: Value,
    second: Value,
    path: &mut Vec<Step>,
    transcript: &mut Transcript,
    space: Space,
) -> Result<Value, MergeError> {
    if tree::is_absent(&second) {
        return Ok(if tree::is_absent(&first) && !second.is_null() {
            second
        } else {
            first
        });
    }
    if tree::is_absent(&first) {
        return Ok(second);
    }
    match (first, second) {
        (Value::Object(mut fields), Value::Object(others)) => {
            transcript.shared.insert(path.clone());
            for (name, other) in others {
                let mine = fields.remove(&name).unwrap_or(Value::Null);
                path.push(Step::from(&name));
                let merged = merge_values(mine, other, path, transcript, space)?;
                path.pop();
                fields.insert(name, merged);
            }
            Ok(Value::Object(fields))
        }
        (Value::Array(mut items), Value::Array(others)) => {
            transcript.shared.insert(path.clone());
            let offset = items.len();
            for (index, other) in others.into_iter().enumerate() {
                let mut from = path.clone();
                from.push(Step::Index(index));
                let mut to = path.clone();
                to.push(Step::Index(offset + index));
                transcript.moved.insert(from, to);
                items.push(other);
            }
            Ok(Value::Array(items))
        }
        (first, second) if is_container(&first) || is_container(&second) => Err(MergeError::Shape {
            location: Location::new(space, path.clone()),
            first: tree::kind(&first),
            second: tree::kind(&second),
        }),
        (first, second) => Err(MergeError::Value {
            location: Location::new(space, path.clone()),
            first: first.to_string(),
            second: second.to_string(),
        }),
    }
}

/// Deep-unions two documents and their provenance
///
/// Records are merged field by field. Lists are concatenated, the first document's elements
/// before the second's, so the second document's list elements (and everything below them)
/// move to their new positions. A value set on only one side is kept along with its provenance.
/// A scalar set on both sides is rejected, even when the two values agree. Where both sides hold
/// the same record or list, the node is attributed to the sources of both.
/// Any other destination claimed by both translation sets is a conflict.
/// ```
/// use kindling_translate::{loc, merge_translated, MergeError, Space, TranslationSet};
/// use serde_json::{json, Value};
///
/// let main = json!({"disks": [{"device": "/dev/vda"}]});
/// let mut main_ts = TranslationSet::new(Space::Authoring, Space::Target);
/// main_ts.add_translation(loc!(Authoring, "disks", 0, "device"), loc!(Target, "disks", 0, "device"));
///
/// let extra = json!({"disks": [{"device": "/dev/vdb"}]});
/// let mut extra_ts = TranslationSet::new(Space::Authoring, Space::Target);
/// extra_ts.add_translation(loc!(Authoring, "boot_device"), loc!(Target, "disks", 0, "device"));
///
/// let (merged, ts): (Value, _) = merge_translated(&main, &main_ts, &extra, &extra_ts)?;
/// assert_eq!(merged["disks"][1]["device"], "/dev/vdb");
/// assert_eq!(
///     ts.find_source(&loc!(Target, "disks", 1, "device")),
///     Some(loc!(Authoring, "boot_device"))
/// );
///
/// let clash = json!({"disks": {"device": "/dev/vdc"}});
/// assert!(matches!(
///     merge_translated(&main, &main_ts, &clash, &extra_ts),
///     Err(MergeError::Shape { .. })
/// ));
/// # Ok::<(), MergeError>(())
/// ```
pub fn merge_translated<T>(
    first: &T,
    first_translations: &TranslationSet,
    second: &T,
    second_translations: &TranslationSet,
) -> Result<(T, TranslationSet), MergeError>
where
    T: Serialize + DeserializeOwned,
{
    let space = first_translations.to_space();
    let mut transcript = Transcript::default();
    let merged = merge_values(
        tree::to_tree(first),
        tree::to_tree(second),
        &mut Vec::new(),
        &mut transcript,
        space,
    )?;

    let mut translations =
        TranslationSet::new(first_translations.from_space(), first_translations.to_space());
    for (dest, sources) in first_translations.clone().into_entries() {
        place(&mut translations, &transcript, dest.steps().to_vec(), sources)?;
    }
    for (dest, sources) in second_translations.clone().into_entries() {
        let steps = transcript.remap(dest.steps());
        place(&mut translations, &transcript, steps, sources)?;
    }
    tracing::trace!(
        "Merged documents; {} list elements moved, {} nodes shared",
        transcript.moved.len(),
        transcript.shared.len()
    );

    let merged = serde_json::from_value(merged).map_err(|e| MergeError::Document(e.to_string()))?;
    Ok((merged, translations))
}

fn place(
    translations: &mut TranslationSet,
    transcript: &Transcript,
    steps: Vec<Step>,
    sources: BTreeSet<Location>,
) -> Result<(), MergeError> {
    let shared = transcript.shared.contains(&steps);
    let dest = Location::new(translations.to_space(), steps);
    if shared {
        translations.insert_shared(dest, sources);
        Ok(())
    } else {
        translations.insert_exclusive(dest, sources)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::loc;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Storage {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        disks: Vec<Disk>,
        #[serde(skip_serializing_if = "Option::is_none")]
        wipe: Option<bool>,
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Disk {
        device: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        partitions: Vec<String>,
    }

    fn set() -> TranslationSet {
        TranslationSet::new(Space::Authoring, Space::Target)
    }

    fn disk(device: &str, partitions: &[&str]) -> Disk {
        Disk {
            device: Some(device.into()),
            partitions: partitions.iter().map(|&p| p.to_owned()).collect(),
        }
    }

    #[test]
    fn differing_scalars_are_rejected() {
        let first = Storage {
            wipe: Some(true),
            ..Default::default()
        };
        let second = Storage {
            wipe: Some(false),
            ..Default::default()
        };
        assert_eq!(
            merge_translated(&first, &set(), &second, &set()),
            Err(MergeError::Value {
                location: loc!(Target, "wipe"),
                first: "true".into(),
                second: "false".into(),
            })
        );
    }

    #[test]
    fn equal_scalars_are_rejected() {
        let first = Storage {
            wipe: Some(true),
            ..Default::default()
        };
        assert_eq!(
            merge_translated(&first, &set(), &first.clone(), &set()),
            Err(MergeError::Value {
                location: loc!(Target, "wipe"),
                first: "true".into(),
                second: "true".into(),
            })
        );
    }

    #[test]
    fn one_sided_scalar_keeps_its_provenance() {
        let first = Storage::default();
        let second = Storage {
            wipe: Some(false),
            ..Default::default()
        };
        let mut second_ts = set();
        second_ts.add_translation(loc!(Authoring, "wipe_table"), loc!(Target, "wipe"));
        let (merged, ts) = merge_translated(&first, &set(), &second, &second_ts).unwrap();
        assert_eq!(merged.wipe, Some(false));
        assert_eq!(
            ts.find_source(&loc!(Target, "wipe")),
            Some(loc!(Authoring, "wipe_table"))
        );
    }

    #[test]
    fn lists_concatenate_and_move_nested_provenance() {
        let first = Storage {
            disks: vec![disk("/dev/vda", &["a"])],
            ..Default::default()
        };
        let second = Storage {
            disks: vec![disk("/dev/vdb", &["b", "c"]), disk("/dev/vdc", &[])],
            ..Default::default()
        };
        let mut first_ts = set();
        first_ts.add_translation(loc!(Authoring, "disks"), loc!(Target, "disks"));
        first_ts.add_translation(loc!(Authoring, "disks", 0), loc!(Target, "disks", 0));
        let mut second_ts = set();
        second_ts.add_translation(loc!(Authoring, "boot_device"), loc!(Target, "disks"));
        second_ts.add_translation(
            loc!(Authoring, "boot_device", "mirror"),
            loc!(Target, "disks", 0, "partitions", 1),
        );
        second_ts.add_translation(
            loc!(Authoring, "boot_device", "luks"),
            loc!(Target, "disks", 1, "device"),
        );

        let (merged, ts) = merge_translated(&first, &first_ts, &second, &second_ts).unwrap();
        let devices: Vec<_> = merged.disks.iter().map(|d| d.device.as_deref()).collect();
        assert_eq!(devices, [Some("/dev/vda"), Some("/dev/vdb"), Some("/dev/vdc")]);

        assert_eq!(
            ts.sources(&loc!(Target, "disks")),
            Some(&BTreeSet::from([
                loc!(Authoring, "boot_device"),
                loc!(Authoring, "disks")
            ]))
        );
        assert_eq!(
            ts.find_source(&loc!(Target, "disks", 1, "partitions", 1)),
            Some(loc!(Authoring, "boot_device", "mirror"))
        );
        assert_eq!(
            ts.find_source(&loc!(Target, "disks", 2, "device")),
            Some(loc!(Authoring, "boot_device", "luks"))
        );
        assert_eq!(
            ts.find_source(&loc!(Target, "disks", 0)),
            Some(loc!(Authoring, "disks", 0))
        );
    }

    #[test]
    fn conflicting_provenance_is_surfaced() {
        // The same destination recorded on both sides without either side holding a value there
        let mut first_ts = set();
        first_ts.add_translation(loc!(Authoring, "a"), loc!(Target, "ghost"));
        let mut second_ts = set();
        second_ts.add_translation(loc!(Authoring, "b"), loc!(Target, "ghost"));
        assert_eq!(
            merge_translated(&json!({}), &first_ts, &json!({}), &second_ts),
            Err(MergeError::Translation {
                location: loc!(Target, "ghost")
            })
        );
    }
}
