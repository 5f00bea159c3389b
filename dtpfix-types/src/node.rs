use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field carrying the legacy IFC classification label.
///
/// Unlike `isAsDesigned` and `hasElementType` this is not resolved through
/// the ontology config; the service exposes it under this literal name.
pub const IFC_CLASS_FIELD: &str = "ifc:Class";

/// An element node as returned by the graph service.
///
/// Only `_iri` is structurally required. Everything else is kept in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    #[serde(rename = "_iri")]
    pub iri: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ElementNode {
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The node's `ifc:Class` label, if the field is present.
    ///
    /// String values are returned verbatim; any other JSON value is rendered
    /// as JSON text so it can still be looked up in (and reported against)
    /// the class mapping.
    ///
    /// The delete guard is compared as text too: a numeric `7` and the
    /// string `"7"` produce the same label and the same guard value.
    pub fn ifc_class(&self) -> Option<String> {
        self.get(IFC_CLASS_FIELD).map(value_label)
    }
}

/// Render a field value as the label string used by the mapping and the
/// delete guard. Distinct JSON types with the same text compare equal.
pub fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One page of a cursor-paginated node listing.
///
/// `size` is signed because the service contract allows a non-positive size
/// to signal the end of the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub items: Vec<ElementNode>,

    pub size: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl Page {
    /// A page whose `size` matches its item count.
    pub fn new(items: Vec<ElementNode>, next: Option<String>) -> Self {
        let size = items.len() as i64;
        Self { items, size, next }
    }

    pub fn empty() -> Self {
        Self {
            items: vec![],
            size: 0,
            next: None,
        }
    }
}
