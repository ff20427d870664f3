//! Header/body splitting for metadata documents.
//!
//! A metadata document is Markdown with an optional YAML header delimited by `---` lines.
//! A document that does not open with the delimiter simply has no header. A header that is
//! opened but never closed runs to the end of the document and leaves the body empty.

use crate::constants::HEADER_DELIMITER;
use crate::error::FrontMatterError;
use serde_yaml::{Mapping, Value};

/// A metadata document split into its parsed header and prose body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub header: Mapping,
    pub body: String,
}

/// Split `input` into a parsed YAML header and the body that follows it.
pub fn parse_document(input: &str) -> Result<ParsedDocument, FrontMatterError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let Some((front_matter, body)) = split_front_matter(input) else {
        return Ok(ParsedDocument {
            header: Mapping::new(),
            body: input.to_string(),
        });
    };

    let header = if front_matter.trim().is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(front_matter)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => return Err(FrontMatterError::NotMapping),
        }
    };

    Ok(ParsedDocument {
        header,
        body: body.to_string(),
    })
}

/// Returns `(front_matter, body)` slices into `input`, or `None` when there is no header.
fn split_front_matter(input: &str) -> Option<(&str, &str)> {
    let mut chunks = input.split_inclusive('\n');

    let first = chunks.next()?;
    if first.trim_end_matches(['\n', '\r']) != HEADER_DELIMITER {
        return None;
    }

    let mut offset = first.len();

    // Find the closing delimiter line; both halves are slices of `input`.
    for chunk in chunks {
        let line = chunk.trim_end_matches(['\n', '\r']);
        if line == HEADER_DELIMITER {
            let front = &input[first.len()..offset];
            let body = &input[offset + chunk.len()..];
            return Some((front, body));
        }
        offset += chunk.len();
    }

    // No closing line: everything after the opening delimiter is header.
    Some((&input[first.len()..], ""))
}
