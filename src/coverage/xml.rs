//! JaCoCo XML loading
//!
//! The report is read fully into a small owned element tree. Text content is
//! dropped since JaCoCo keeps all of its data in attributes.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

use crate::error::ExportError;

/// An XML element with its attributes and child elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Value of an attribute, if present
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct children with the given tag name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All elements below this one in document order (pre-order, self excluded)
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Element>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let siblings = self.stack.last_mut()?;
            match siblings.next() {
                Some(element) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Load a JaCoCo XML report and return its root element
pub fn parse_report(path: &Path) -> Result<Element, ExportError> {
    if !path.exists() {
        return Err(ExportError::InputNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| ExportError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report_str(&content)
}

/// Parse XML content from a string into an element tree
pub fn parse_report_str(content: &str) -> Result<Element, ExportError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if open.is_empty() && root.is_some() {
                    return Err(malformed("junk after document element"));
                }
                open.push(read_element(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = read_element(e)?;
                attach(&mut open, &mut root, element)?;
            }
            Ok(Event::End(ref e)) => {
                let element = open.pop().ok_or_else(|| {
                    malformed(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                attach(&mut open, &mut root, element)?;
            }
            Ok(Event::Text(ref t)) if open.is_empty() => {
                if !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(malformed("text outside of the document element"));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open.last() {
        return Err(malformed(format!("unclosed element <{}>", unclosed.name)));
    }
    root.ok_or_else(|| malformed("no element found"))
}

fn read_element(e: &BytesStart<'_>) -> Result<Element, ExportError> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(format!("<{}>: {}", element.name, err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(format!("<{}> attribute '{}': {}", element.name, key, err)))?
            .to_string();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ExportError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(malformed("junk after document element"));
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn malformed(message: impl Into<String>) -> ExportError {
    ExportError::MalformedInput(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<!DOCTYPE report PUBLIC "-//JACOCO//DTD Report 1.1//EN" "report.dtd">
<report name="demo">
    <sessioninfo id="host-1" start="1" dump="2"/>
    <package name="com/example">
        <sourcefile name="Main.java">
            <line nr="3" mi="0" ci="3" mb="0" cb="0"/>
            <counter type="LINE" missed="1" covered="4"/>
        </sourcefile>
        <counter type="LINE" missed="1" covered="4"/>
    </package>
    <counter type="INSTRUCTION" missed="5" covered="20"/>
    <counter type="LINE" missed="1" covered="4"/>
</report>"#;

    #[test]
    fn test_parse_report_tree() {
        let root = parse_report_str(REPORT).unwrap();

        assert_eq!(root.name, "report");
        assert_eq!(root.attr("name"), Some("demo"));
        assert_eq!(root.children.len(), 4);
        assert_eq!(root.children_named("counter").count(), 2);

        let package = root.children_named("package").next().unwrap();
        assert_eq!(package.attr("name"), Some("com/example"));
        assert_eq!(package.children[0].attr("name"), Some("Main.java"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = parse_report_str(REPORT).unwrap();
        let names: Vec<&str> = root.descendants().map(|e| e.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "sessioninfo",
                "package",
                "sourcefile",
                "line",
                "counter",
                "counter",
                "counter",
                "counter",
            ]
        );
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let root = parse_report_str(r#"<report name="a &amp; b"/>"#).unwrap();
        assert_eq!(root.attr("name"), Some("a & b"));
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let root = parse_report_str("\u{feff}<report/>").unwrap();
        assert_eq!(root.name, "report");
    }

    #[test]
    fn test_malformed_input() {
        let cases = [
            "",
            "not xml at all",
            "<report>",
            "<report><counter></report>",
            "<report/><report/>",
            r#"<report name="&bogus;"/>"#,
            r#"<report a="1" a="2"/>"#,
        ];

        for xml in cases {
            let err = parse_report_str(xml).unwrap_err();
            assert!(
                matches!(err, ExportError::MalformedInput(_)),
                "expected malformed input for {:?}, got {:?}",
                xml,
                err
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_report(&dir.path().join("jacoco.xml")).unwrap_err();
        assert!(matches!(err, ExportError::InputNotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
