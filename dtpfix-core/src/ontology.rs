//! XML ontology config.
//!
//! Only the `URI` elements are read; everything else in the file (API
//! endpoints, credentials sections, ...) is ignored. Both forms are accepted:
//!
//! ```xml
//! <DTP_CONFIG>
//!   <ONTOLOGY_URIS>
//!     <URI field="isAsDesigned">https://example.org/ontology#isAsDesigned</URI>
//!     <URI field="hasElementType" uri="https://example.org/ontology#hasElementType"/>
//!   </ONTOLOGY_URIS>
//! </DTP_CONFIG>
//! ```

use anyhow::{Context, bail};
use camino::Utf8Path;
use dtpfix_domain::OntologyResolver;
use fs_err as fs;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeMap;
use tracing::debug;

const URI_TAG: &[u8] = b"URI";

/// Logical field name to ontology URI table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DtpConfig {
    uris: BTreeMap<String, String>,
}

impl DtpConfig {
    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let xml = fs::read_to_string(path).with_context(|| format!("read ontology config {path}"))?;
        Self::parse(&xml).with_context(|| format!("parse ontology config {path}"))
    }

    /// Parse the config. A repeated field keeps its last URI.
    pub fn parse(xml: &str) -> anyhow::Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut uris = BTreeMap::new();
        // Field of the currently open <URI> and the text seen inside it.
        let mut open: Option<(String, Option<String>)> = None;

        loop {
            match reader.read_event().context("malformed XML")? {
                Event::Start(e) if e.name().as_ref() == URI_TAG => {
                    let field = required_attr(&e, "field")?;
                    let inline = optional_attr(&e, "uri")?;
                    open = Some((field, inline));
                }
                Event::Empty(e) if e.name().as_ref() == URI_TAG => {
                    let field = required_attr(&e, "field")?;
                    let Some(uri) = optional_attr(&e, "uri")? else {
                        bail!("empty URI for ontology field '{field}'");
                    };
                    insert(&mut uris, field, uri);
                }
                Event::Text(t) => {
                    if let Some((_, text)) = open.as_mut() {
                        let value = t.unescape().context("invalid URI text")?;
                        let value = value.trim();
                        if !value.is_empty() {
                            *text = Some(value.to_string());
                        }
                    }
                }
                Event::End(e) if e.name().as_ref() == URI_TAG => match open.take() {
                    Some((field, Some(uri))) => insert(&mut uris, field, uri),
                    Some((field, None)) => bail!("empty URI for ontology field '{field}'"),
                    None => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { uris })
    }

    pub fn uris(&self) -> &BTreeMap<String, String> {
        &self.uris
    }
}

impl OntologyResolver for DtpConfig {
    fn get_ontology_uri(&self, logical_name: &str) -> Option<&str> {
        self.uris.get(logical_name).map(String::as_str)
    }
}

fn insert(uris: &mut BTreeMap<String, String>, field: String, uri: String) {
    debug!(field = field.as_str(), uri = uri.as_str(), "ontology uri");
    uris.insert(field, uri);
}

fn optional_attr(e: &BytesStart<'_>, name: &str) -> anyhow::Result<Option<String>> {
    let Some(attr) = e
        .try_get_attribute(name)
        .with_context(|| format!("invalid attribute '{name}'"))?
    else {
        return Ok(None);
    };
    let value = attr
        .unescape_value()
        .with_context(|| format!("invalid value for attribute '{name}'"))?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn required_attr(e: &BytesStart<'_>, name: &str) -> anyhow::Result<String> {
    optional_attr(e, name)?.with_context(|| {
        format!(
            "<{}> element without a '{name}' attribute",
            String::from_utf8_lossy(URI_TAG)
        )
    })
}
