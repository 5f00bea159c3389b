use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping value meaning "leave nodes of this class alone".
pub const SKIP_SENTINEL: &str = "ignore";

/// What the mapping says to do with a given label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingTarget<'a> {
    Relabel(&'a str),
    Skip,
}

impl<'a> MappingTarget<'a> {
    pub fn new_label(self) -> Option<&'a str> {
        match self {
            MappingTarget::Relabel(label) => Some(label),
            MappingTarget::Skip => None,
        }
    }
}

/// Old element-type label to new label (or the skip sentinel).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMapping {
    entries: BTreeMap<String, String>,
}

impl ClassMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.entries.insert(old.into(), new.into());
    }

    /// Look up a label. `None` means the mapping has no entry for it.
    pub fn get(&self, label: &str) -> Option<MappingTarget<'_>> {
        self.entries.get(label).map(|v| {
            if v == SKIP_SENTINEL {
                MappingTarget::Skip
            } else {
                MappingTarget::Relabel(v.as_str())
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ClassMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = ClassMapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}
