// Parsed help document tree
// The loader only ever reads this tree; parsing is a thin quick-xml pass.

use crate::error::LoadError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<DocElement>,
    /// Concatenated text content directly inside this element
    pub contents: String,
}

impl DocElement {
    pub fn new(tag: &str) -> Self {
        DocElement {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, child: DocElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_contents(mut self, contents: &str) -> Self {
        self.contents = contents.to_string();
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Numeric attribute; non-numeric values read as `None`
    pub fn number_attr(&self, key: &str) -> Option<f64> {
        self.attr(key).and_then(|v| v.trim().parse::<f64>().ok())
    }

    pub fn flag_attr(&self, key: &str) -> bool {
        self.attr(key) == Some("true")
    }

    pub fn child_named(&self, tag: &str) -> Option<&DocElement> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn require(&self, tag: &str) -> Result<&DocElement, LoadError> {
        self.child_named(tag).ok_or_else(|| LoadError::MissingElement {
            parent: self.tag.clone(),
            tag: tag.to_string(),
        })
    }
}

/// Parse a help document from XML text
pub fn parse_document(xml: &str) -> Result<DocElement, LoadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<DocElement> = Vec::new();
    let mut root: Option<DocElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(element_from_start(&reader, &e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from_start(&reader, &e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| LoadError::Xml("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|err| LoadError::Xml(format!("text decode error: {err:?}")))?;
                if let Some(current) = stack.last_mut() {
                    current.contents.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| LoadError::Xml(format!("cdata decode error: {err:?}")))?;
                if let Some(current) = stack.last_mut() {
                    current.contents.push_str(&text);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e
                    .decode()
                    .map_err(|err| LoadError::Xml(format!("entity decode error: {err:?}")))?;
                let entity = format!("&{name};");
                let resolved = quick_xml::escape::unescape(&entity)
                    .map_err(|err| LoadError::Xml(format!("unknown entity {entity}: {err:?}")))?;
                if let Some(current) = stack.last_mut() {
                    current.contents.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(LoadError::Xml(format!(
                    "error at position {}: {err:?}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if !stack.is_empty() {
        return Err(LoadError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| LoadError::Xml("document has no root element".to_string()))
}

fn attach(
    stack: &mut [DocElement],
    root: &mut Option<DocElement>,
    element: DocElement,
) -> Result<(), LoadError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(LoadError::Xml("multiple root elements".to_string())),
    }
}

fn element_from_start(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<DocElement, LoadError> {
    let tag = reader
        .decoder()
        .decode(e.name().as_ref())
        .map_err(|err| LoadError::Xml(format!("tag decode error: {err:?}")))?
        .into_owned();
    let mut element = DocElement::new(&tag);
    for attr in e.attributes().flatten() {
        let key = match reader.decoder().decode(attr.key.as_ref()) {
            Ok(k) => k.into_owned(),
            Err(_) => continue,
        };
        let raw = match reader.decoder().decode(&attr.value) {
            Ok(v) => v.into_owned(),
            Err(_) => continue,
        };
        let value = match quick_xml::escape::unescape(&raw) {
            Ok(v) => v.into_owned(),
            Err(_) => raw,
        };
        element.attributes.insert(key, value);
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let xml = r#"<help version="1">
            <thumbnail><script/></thumbnail>
            <box color="blue"><p id="intro">Hello &amp; welcome</p></box>
        </help>"#;
        let doc = parse_document(xml).unwrap();
        assert_eq!(doc.tag, "help");
        assert_eq!(doc.number_attr("version"), Some(1.0));
        assert_eq!(doc.children.len(), 2);
        let p = &doc.children[1].children[0];
        assert_eq!(p.attr("id"), Some("intro"));
        assert_eq!(p.contents, "Hello & welcome");
    }

    #[test]
    fn test_require_reports_missing_child() {
        let doc = DocElement::new("diagram");
        let err = doc.require("script").unwrap_err();
        assert_eq!(err.to_string(), "<diagram> requires a <script> child");
    }

    #[test]
    fn test_rejects_unbalanced_document() {
        assert!(parse_document("<help><box></help>").is_err());
        assert!(parse_document("").is_err());
    }
}
