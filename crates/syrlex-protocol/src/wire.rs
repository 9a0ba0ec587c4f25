//! XML command-list wire codec.
//!
//! Documents have the fixed shape
//! `<sc version="1.0"><d><c n="MNEMONIC" v="VALUE"/>...</d></sc>`.
//! Inbound documents are decoded into a mnemonic/value map; outbound
//! documents are rendered from a canonical getter list plus whatever setters
//! were drained from the device's pending queue.

use std::collections::HashMap;

use crate::commands::setter_for;
use crate::error::ProtocolError;

const XML_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// Decode an appliance command document into a mnemonic -> value map.
///
/// Values may be empty strings. Any parse failure or deviation from the
/// `sc`/`d`/`c` structure is reported as
/// [`ProtocolError::MalformedDocument`].
pub fn decode(document: &str) -> Result<HashMap<String, String>, ProtocolError> {
    let doc = roxmltree::Document::parse(document)
        .map_err(|e| ProtocolError::MalformedDocument(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "sc" {
        return Err(ProtocolError::MalformedDocument(format!(
            "expected <sc> root, found <{}>",
            root.tag_name().name()
        )));
    }
    let list = root
        .children()
        .filter(|node| node.is_element())
        .find(|node| node.has_tag_name("d"))
        .ok_or_else(|| ProtocolError::MalformedDocument("missing <d> element".to_string()))?;

    let mut commands = HashMap::new();
    for node in list.children().filter(|node| node.is_element()) {
        if node.tag_name().name() != "c" {
            return Err(ProtocolError::MalformedDocument(format!(
                "unexpected <{}> in command list",
                node.tag_name().name()
            )));
        }
        let name = node.attribute("n").ok_or_else(|| {
            ProtocolError::MalformedDocument("command without n attribute".to_string())
        })?;
        let value = node.attribute("v").unwrap_or("");
        commands.insert(name.to_string(), value.to_string());
    }
    Ok(commands)
}

/// Encode a poll response from the canonical getter list and drained setters.
///
/// A setter whose getter counterpart appears in the list replaces that
/// getter in place; setters with no counterpart trail the list. Every entry
/// of `setters` ends up in the document exactly once, so a drained queue is
/// never partially delivered.
pub fn encode(getters: &[String], mut setters: HashMap<String, String>) -> String {
    let mut body = String::new();
    for getter in getters {
        let setter = setter_for(getter);
        match setters.remove(&setter) {
            Some(value) => push_command(&mut body, &setter, &value),
            None => push_command(&mut body, getter, ""),
        }
    }
    // Leftovers in deterministic order.
    let mut trailing: Vec<(String, String)> = setters.drain().collect();
    trailing.sort();
    for (name, value) in trailing {
        push_command(&mut body, &name, &value);
    }
    format!("{XML_PROLOG}<sc version=\"1.0\"><d>{body}</d></sc>")
}

fn push_command(out: &mut String, name: &str, value: &str) {
    out.push_str("<c n=\"");
    out.push_str(name);
    out.push_str("\" v=\"");
    out.push_str(value);
    out.push_str("\"/>");
}
