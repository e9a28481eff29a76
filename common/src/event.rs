use log::{debug, trace};
use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

use crate::catalog;

pub const PS_NAMESPACE: &str = "http://schemas.microsoft.com/powershell/2004/04";

/// Written in place of any value that could not be found.
pub const NOT_AVAILABLE: &str = "N/A";

// Type markers used by CLIXML property bags
const OBJ: &str = "Obj";
const PROPS: &str = "Props";
const INT32: &str = "I32";
const STRING: &str = "S";
const DATETIME: &str = "DT";

/// Identity fields read by position from the `Properties` list of an event.
///
/// The list is a plain sequence of `EventProperty` objects: nothing in the
/// document says which entry holds which value. The positions below match
/// the layout of the Security log records this tool was written against and
/// will silently pick the wrong entry if that layout changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionalField {
    UserAccount,
    Domain,
    IpAddress,
}

impl PositionalField {
    pub const fn position(&self) -> usize {
        match self {
            PositionalField::UserAccount => 4,
            PositionalField::Domain => 5,
            PositionalField::IpAddress => 18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEvent {
    event_id: String,
    description: String,
    log_name: String,
    machine_name: String,
    provider_name: String,
    time_created: String,
    user_account: String,
    domain: String,
    ip_address: String,
}

impl ExtractedEvent {
    /// Column names, in the order returned by [`ExtractedEvent::fields`].
    pub const COLUMNS: [&'static str; 9] = [
        "EventID",
        "Description",
        "LogName",
        "MachineName",
        "ProviderName",
        "TimeCreated",
        "UserAccount",
        "Domain",
        "IPAddress",
    ];

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn time_created(&self) -> &str {
        &self.time_created
    }

    pub fn user_account(&self) -> &str {
        &self.user_account
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn fields(&self) -> [&str; 9] {
        [
            &self.event_id,
            &self.description,
            &self.log_name,
            &self.machine_name,
            &self.provider_name,
            &self.time_created,
            &self.user_account,
            &self.domain,
            &self.ip_address,
        ]
    }

    /// One line description, shown to the operator.
    pub fn summary(&self) -> String {
        format!(
            "Event {} - {}: User={}, Domain={}, IP={}",
            self.event_id, self.description, self.user_account, self.domain, self.ip_address
        )
    }
}

#[derive(Debug, Default, Clone)]
pub struct Extraction {
    root_tag: String,
    candidates: usize,
    events: Vec<ExtractedEvent>,
}

impl Extraction {
    /// Root element name, in `{namespace}name` notation.
    pub fn root_tag(&self) -> &str {
        &self.root_tag
    }

    /// Number of `Obj` nodes found in the document.
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn events(&self) -> &[ExtractedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ExtractedEvent> {
        self.events
    }
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Error parsing the XML file: {0}")]
    Parse(#[from] roxmltree::Error),
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.has_tag_name((PS_NAMESPACE, tag)))
}

/// Finds the property `<kind N="name">` directly under a `Props` node.
fn property<'a, 'input>(
    props: &Node<'a, 'input>,
    kind: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    props
        .children()
        .find(|n| n.has_tag_name((PS_NAMESPACE, kind)) && n.attribute("N") == Some(name))
}

/// All `Obj` nodes below `node`, in document order. `node` itself is
/// never part of the result.
fn descendant_objects<'a, 'input>(node: &Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    // descendants() starts with the node itself
    node.descendants()
        .skip(1)
        .filter(|n| n.has_tag_name((PS_NAMESPACE, OBJ)))
        .collect()
}

fn text_or_na(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => t.to_owned(),
        _ => NOT_AVAILABLE.to_owned(),
    }
}

fn clark_name(node: &Node) -> String {
    let tag = node.tag_name();
    match tag.namespace() {
        Some(ns) => format!("{{{}}}{}", ns, tag.name()),
        None => tag.name().to_owned(),
    }
}

/// Value of the `EventProperty` found at `field`'s position, if any.
pub fn nested_value<'a, 'input>(
    properties: &[Node<'a, 'input>],
    field: PositionalField,
) -> Option<&'a str> {
    let obj = properties.get(field.position())?;
    let props = child(obj, PROPS)?;
    property(&props, STRING, "Value")?.text()
}

fn extract_event(obj: &Node) -> Option<ExtractedEvent> {
    let props = match child(obj, PROPS) {
        Some(props) => props,
        None => {
            trace!("Obj at offset {} has no Props, skipping", obj.range().start);
            return None;
        }
    };

    let event_id = match property(&props, INT32, "Id").and_then(|n| n.text()) {
        Some(id) => id,
        None => {
            trace!("Obj at offset {} has no Id, skipping", obj.range().start);
            return None;
        }
    };

    let description = match catalog::describe(event_id) {
        Some(description) => description,
        None => {
            trace!("Event {} is not in the catalog, skipping", event_id);
            return None;
        }
    };

    let log_name = text_or_na(property(&props, STRING, "LogName").and_then(|n| n.text()));
    let time_created =
        text_or_na(property(&props, DATETIME, "TimeCreated").and_then(|n| n.text()));
    let machine_name =
        text_or_na(property(&props, STRING, "MachineName").and_then(|n| n.text()));
    let provider_name =
        text_or_na(property(&props, STRING, "ProviderName").and_then(|n| n.text()));

    let properties = match property(&props, OBJ, "Properties") {
        Some(node) => descendant_objects(&node),
        None => {
            debug!(
                "Event {} at offset {} has no Properties object",
                event_id,
                obj.range().start
            );
            Vec::new()
        }
    };
    if !properties.is_empty() && properties.len() <= PositionalField::IpAddress.position() {
        debug!(
            "Properties of event {} only has {} entries, some identity fields will be missing",
            event_id,
            properties.len()
        );
    }

    Some(ExtractedEvent {
        event_id: event_id.to_owned(),
        description: description.to_owned(),
        log_name,
        machine_name,
        provider_name,
        time_created,
        user_account: text_or_na(nested_value(&properties, PositionalField::UserAccount)),
        domain: text_or_na(nested_value(&properties, PositionalField::Domain)),
        ip_address: text_or_na(nested_value(&properties, PositionalField::IpAddress)),
    })
}

/// Parses a CLIXML document and returns the catalogued events it contains,
/// in document order.
pub fn extract_events(content: &str) -> Result<Extraction, ExtractError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(content, options)?;
    let root = doc.root_element();
    let root_tag = clark_name(&root);
    debug!("Root element is {}", root_tag);

    let candidates = descendant_objects(&root);
    let events: Vec<ExtractedEvent> = candidates.iter().filter_map(extract_event).collect();
    debug!(
        "Extracted {} events out of {} objects",
        events.len(),
        candidates.len()
    );

    Ok(Extraction {
        root_tag,
        candidates: candidates.len(),
        events,
    })
}
