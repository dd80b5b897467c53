/// Field extraction from the current page
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pattern::Params;
use crate::services::{Extractor, ServiceDefinition};

/// Read-only view of a page, queried by CSS selector.
///
/// Implemented for the live browser document and for parsed static HTML.
/// An invalid selector behaves like a selector that matches nothing.
pub trait Document {
    fn query(&self, selector: &str) -> Option<Box<dyn Element + '_>>;
}

pub trait Element {
    fn text_content(&self) -> Option<String>;

    fn attribute(&self, name: &str) -> Option<String>;

    /// Current value of a form control (`<textarea>`, `<input>`)
    fn value(&self) -> Option<String>;

    /// Text content of the element's first child node
    fn first_child_text(&self) -> Option<String>;
}

/// What to read from the element a probe selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    Text,
    Attr(&'static str),
    Value,
    FirstChildText,
}

/// One step of an extraction chain: a selector plus what to read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub selector: &'static str,
    pub read: Read,
}

impl Probe {
    pub const fn text(selector: &'static str) -> Probe {
        Probe { selector, read: Read::Text }
    }

    pub const fn attr(selector: &'static str, name: &'static str) -> Probe {
        Probe { selector, read: Read::Attr(name) }
    }

    pub const fn value(selector: &'static str) -> Probe {
        Probe { selector, read: Read::Value }
    }

    pub const fn first_child_text(selector: &'static str) -> Probe {
        Probe { selector, read: Read::FirstChildText }
    }

    /// The trimmed value this probe reads, or `None` if the node is missing
    /// or the value is blank.
    pub fn read(&self, document: &dyn Document) -> Option<String> {
        let element = document.query(self.selector)?;
        let raw = match self.read {
            Read::Text => element.text_content(),
            Read::Attr(name) => element.attribute(name),
            Read::Value => element.value(),
            Read::FirstChildText => element.first_child_text(),
        }?;
        non_empty(raw.trim())
    }
}

/// Evaluate probes in order and return the first non-empty trimmed value.
pub fn first_text(document: &dyn Document, probes: &[Probe]) -> Option<String> {
    probes.iter().find_map(|probe| probe.read(document))
}

static PROJECT_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([\w-]+)\]").expect("project identifier regex is valid")
});

/// Project identifier written in brackets, e.g. `"[WEB-1] Website"` → `"WEB-1"`
pub fn project_identifier(label: &str) -> Option<String> {
    PROJECT_IDENTIFIER
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Bracketed project identifier from the first probe that yields one
pub fn project_identifier_by(document: &dyn Document, probes: &[Probe]) -> Option<String> {
    probes
        .iter()
        .filter_map(|probe| probe.read(document))
        .find_map(|label| project_identifier(&label))
}

/// Human-readable fields derived from the current page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub description: String,
    pub project_id: Option<String>,
    pub project_label: Option<String>,
}

/// Run the service's extraction callbacks against `document`.
///
/// Missing callbacks yield `None`; a missing description becomes `""`.
pub fn extract(
    document: &dyn Document,
    service: &ServiceDefinition,
    params: &Params,
) -> ExtractedFields {
    let run = |callback: Option<Extractor>| {
        callback
            .and_then(|f| f(document, service, params))
            .and_then(|value| non_empty(value.trim()))
    };

    let fields = ExtractedFields {
        description: run(service.description).unwrap_or_default(),
        project_id: run(service.project_id),
        project_label: run(service.project_label),
    };
    log::debug!("extracted fields for {}: {:?}", service.name, fields);
    fields
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
