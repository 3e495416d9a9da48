//! JaCoCo LINE counter aggregation

use super::{Counter, Element, FileCoverageRow, ReportSummary};
use crate::error::ExportError;

const LINE_COUNTER: &str = "LINE";

/// Compute the report-wide line summary.
///
/// A LINE counter directly under the root wins (first one). Without one, the
/// last LINE counter anywhere in the tree is used.
pub fn summarize(root: &Element) -> Result<ReportSummary, ExportError> {
    let counter = direct_line_counter(root)
        .or_else(|| root.descendants().filter(|e| is_line_counter(e)).last())
        .ok_or(ExportError::NoCoverageData)?;

    Ok(ReportSummary::from(read_counter(counter)?))
}

/// One row per `sourcefile` element, most missed lines first
pub fn per_file_rows(root: &Element) -> Result<Vec<FileCoverageRow>, ExportError> {
    let mut rows = Vec::new();

    for sourcefile in root.descendants().filter(|e| e.name == "sourcefile") {
        let counter = match direct_line_counter(sourcefile) {
            Some(counter) => read_counter(counter)?,
            None => count_lines(sourcefile)?,
        };
        rows.push(FileCoverageRow::new(
            sourcefile.attr("name").unwrap_or_default(),
            counter,
        ));
    }

    // stable: equal `missed` keeps document order
    rows.sort_by(|a, b| b.missed.cmp(&a.missed));
    Ok(rows)
}

fn is_line_counter(element: &Element) -> bool {
    element.name == "counter" && element.attr("type") == Some(LINE_COUNTER)
}

fn direct_line_counter(element: &Element) -> Option<&Element> {
    element.children_named("counter").find(|c| is_line_counter(c))
}

fn read_counter(counter: &Element) -> Result<Counter, ExportError> {
    let missed = required_attr(counter, "missed")?;
    let covered = required_attr(counter, "covered")?;
    Ok(Counter::new(
        parse_attr(counter, "missed", missed)?,
        parse_attr(counter, "covered", covered)?,
    ))
}

/// Fallback for sourcefiles without a LINE counter: a line counts as missed
/// when `mi > 0` and as covered when `cb > 0`.
fn count_lines(sourcefile: &Element) -> Result<Counter, ExportError> {
    let mut counter = Counter::default();

    for line in sourcefile.children_named("line") {
        if is_positive(line, "mi")? {
            counter.missed += 1;
        }
        if is_positive(line, "cb")? {
            counter.covered += 1;
        }
    }

    Ok(counter)
}

/// Whether an optional integer attribute is above zero. Only the sign and
/// digits matter, so values of any width are accepted.
fn is_positive(element: &Element, attribute: &str) -> Result<bool, ExportError> {
    let raw = element.attr(attribute).unwrap_or("0");
    let value = raw.trim();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ExportError::InvalidAttribute {
            element: element.name.clone(),
            attribute: attribute.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(!negative && digits.bytes().any(|b| b != b'0'))
}

fn required_attr<'a>(element: &'a Element, attribute: &str) -> Result<&'a str, ExportError> {
    element
        .attr(attribute)
        .ok_or_else(|| ExportError::MissingAttribute {
            element: element.name.clone(),
            attribute: attribute.to_string(),
        })
}

fn parse_attr<T: std::str::FromStr>(
    element: &Element,
    attribute: &str,
    value: &str,
) -> Result<T, ExportError> {
    value
        .trim()
        .parse()
        .map_err(|_| ExportError::InvalidAttribute {
            element: element.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        })
}
