//! Normalisation of loosely-typed header values into the canonical record.
//!
//! Authors write components and patterns as bare strings, as mappings with `Name`/`name`
//! keys, or as something else entirely. Everything here is total: odd shapes degrade to empty
//! strings instead of failing, and required-field absence is left for the validator and
//! linter to report.

use dotcontext_types::{Architecture, Component, MetadataRecord, Pattern, Permissions};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

const KEY_MODULE_NAME: &str = "module-name";
const KEY_VERSION: &str = "version";
const KEY_DESCRIPTION: &str = "description";
const KEY_TECHNOLOGIES: &str = "technologies";
const KEY_CONVENTIONS: &str = "conventions";
const KEY_ARCHITECTURE: &str = "architecture";
const KEY_DEVELOPMENT: &str = "development";
const KEY_BUSINESS_REQUIREMENTS: &str = "business-requirements";
const KEY_PERMISSIONS: &str = "permissions";
const KEY_ALLOW_AI_MODIFICATIONS: &str = "allow-ai-modifications";

const RECOGNISED_KEYS: [&str; 9] = [
    KEY_MODULE_NAME,
    KEY_VERSION,
    KEY_DESCRIPTION,
    KEY_TECHNOLOGIES,
    KEY_CONVENTIONS,
    KEY_ARCHITECTURE,
    KEY_DEVELOPMENT,
    KEY_BUSINESS_REQUIREMENTS,
    KEY_PERMISSIONS,
];

/// Shape of a single component or pattern entry as written by the author.
#[derive(Debug, Clone, Copy)]
enum EntryShape<'a> {
    Text(&'a str),
    Object(&'a Mapping),
    Other,
}

impl<'a> EntryShape<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::String(text) => EntryShape::Text(text),
            Value::Mapping(mapping) => EntryShape::Object(mapping),
            _ => EntryShape::Other,
        }
    }
}

/// Normalise an `architecture.components` value.
///
/// A bare string becomes the component's name with an empty description.
pub fn components_from_value(value: &Value) -> Vec<Component> {
    let Value::Sequence(items) = value else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| match EntryShape::of(item) {
            EntryShape::Text(name) => Component {
                name: name.to_string(),
                description: String::new(),
            },
            EntryShape::Object(fields) => Component {
                name: lookup_field(fields, "Name", "name"),
                description: lookup_field(fields, "Description", "description"),
            },
            EntryShape::Other => Component::default(),
        })
        .collect()
}

/// Normalise an `architecture.patterns` value.
///
/// Unlike components, a bare string entry carries no usable data and becomes an empty
/// pattern.
pub fn patterns_from_value(value: &Value) -> Vec<Pattern> {
    let Value::Sequence(items) = value else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| match EntryShape::of(item) {
            EntryShape::Object(fields) => Pattern {
                name: lookup_field(fields, "Name", "name"),
                usage: lookup_field(fields, "Usage", "usage"),
            },
            EntryShape::Text(_) | EntryShape::Other => Pattern::default(),
        })
        .collect()
}

/// Build the canonical record from a parsed header.
///
/// Required fields are copied as found (absent stays `None`), optional fields are set only
/// when present and non-null, and every unrecognised key lands in `extensions`.
pub fn metadata_from_header(header: &Mapping) -> MetadataRecord {
    let architecture = header.get(KEY_ARCHITECTURE);

    let mut record = MetadataRecord {
        module_name: required_text(header, KEY_MODULE_NAME),
        description: required_text(header, KEY_DESCRIPTION),
        architecture: Architecture {
            style: architecture
                .and_then(|a| a.get("style"))
                .and_then(scalar_text)
                .unwrap_or_default(),
            components: architecture
                .and_then(|a| a.get("components"))
                .map(components_from_value)
                .unwrap_or_default(),
            patterns: architecture
                .and_then(|a| a.get("patterns"))
                .map(patterns_from_value)
                .unwrap_or_default(),
        },
        ..Default::default()
    };

    record.version = present(header, KEY_VERSION).and_then(scalar_text);
    record.technologies = present(header, KEY_TECHNOLOGIES).map(text_list);
    record.conventions = present(header, KEY_CONVENTIONS).map(text_list);
    record.development = present(header, KEY_DEVELOPMENT).and_then(to_json);
    record.business_requirements = present(header, KEY_BUSINESS_REQUIREMENTS).map(text_list);
    record.permissions = present(header, KEY_PERMISSIONS).map(permissions_from_value);
    record.extensions = extensions_from_header(header);

    record
}

/// Field lookup that tries the capitalised key, then the lowercase one, then gives up.
fn lookup_field(fields: &Mapping, capitalised: &str, lowercase: &str) -> String {
    [capitalised, lowercase]
        .iter()
        .filter_map(|key| fields.get(*key).and_then(scalar_text))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// The value under `key`, treating an explicit `null` the same as an absent key.
fn present<'a>(header: &'a Mapping, key: &str) -> Option<&'a Value> {
    header.get(key).filter(|value| !value.is_null())
}

/// Text of a required scalar field. A sequence or mapping in its place is dropped with a
/// warning.
fn required_text(header: &Mapping, key: &str) -> Option<String> {
    let value = present(header, key)?;
    let text = scalar_text(value);
    if text.is_none() {
        tracing::warn!("ignoring non-scalar value for {}", key);
    }
    text
}

/// Render a scalar as text. Numbers and booleans keep their YAML spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// A list of strings from either a sequence or a single scalar.
fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

fn to_json(value: &Value) -> Option<serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!("dropping header value that has no JSON form: {}", e);
            None
        }
    }
}

fn permissions_from_value(value: &Value) -> Permissions {
    let mut permissions = Permissions::default();
    let Value::Mapping(fields) = value else {
        return permissions;
    };

    for (key, field) in fields {
        let Some(key) = key.as_str() else {
            continue;
        };
        if key == KEY_ALLOW_AI_MODIFICATIONS {
            permissions.allow_ai_modifications = field.as_bool();
        } else if let Some(json) = to_json(field) {
            permissions.extra.insert(key.to_string(), json);
        }
    }

    permissions
}

fn extensions_from_header(header: &Mapping) -> BTreeMap<String, serde_json::Value> {
    header
        .iter()
        .filter_map(|(key, value)| {
            let key = key.as_str()?;
            if RECOGNISED_KEYS.contains(&key) {
                return None;
            }
            Some((key.to_string(), to_json(value)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(input: &str) -> Value {
        serde_yaml::from_str(input).expect("valid yaml")
    }

    fn header(input: &str) -> Mapping {
        match yaml(input) {
            Value::Mapping(mapping) => mapping,
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn bare_strings_differ_between_components_and_patterns() {
        let components = components_from_value(&yaml(r#"["Auth"]"#));
        let patterns = patterns_from_value(&yaml(r#"["Auth"]"#));

        assert_eq!(
            components,
            vec![Component {
                name: "Auth".into(),
                description: String::new()
            }]
        );
        assert_eq!(patterns, vec![Pattern::default()]);
    }

    #[test]
    fn object_entries_accept_either_key_casing() {
        let components = components_from_value(&yaml(
            "- Name: Gateway\n  Description: Routes requests\n- name: Store\n  description: Persists data\n",
        ));
        assert_eq!(components[0].name, "Gateway");
        assert_eq!(components[0].description, "Routes requests");
        assert_eq!(components[1].name, "Store");
        assert_eq!(components[1].description, "Persists data");

        let patterns = patterns_from_value(&yaml("- Name: CQRS\n  usage: Read models\n"));
        assert_eq!(
            patterns,
            vec![Pattern {
                name: "CQRS".into(),
                usage: "Read models".into()
            }]
        );
    }

    #[test]
    fn capitalised_key_wins_unless_empty() {
        let components =
            components_from_value(&yaml("- Name: Upper\n  name: lower\n- Name: ''\n  name: lower\n"));
        assert_eq!(components[0].name, "Upper");
        assert_eq!(components[1].name, "lower");
    }

    #[test]
    fn unexpected_shapes_degrade_to_empty_fields() {
        assert!(components_from_value(&yaml("Gateway")).is_empty());
        assert!(patterns_from_value(&yaml("{ name: x }")).is_empty());

        let components = components_from_value(&yaml("- 42\n- [nested]\n- ~\n"));
        assert_eq!(components, vec![Component::default(); 3]);
    }

    #[test]
    fn required_fields_are_not_defaulted() {
        let record = metadata_from_header(&header("version: 1.0.0\n"));
        assert_eq!(record.module_name, None);
        assert_eq!(record.description, None);
        assert_eq!(record.architecture, Architecture::default());
    }

    #[test]
    fn optional_fields_are_copied_only_when_present() {
        let record = metadata_from_header(&header(
            "module-name: auth\ndescription: Login\ntechnologies: []\nconventions: ~\n",
        ));
        assert_eq!(record.module_name.as_deref(), Some("auth"));
        assert_eq!(record.technologies, Some(Vec::new()));
        assert_eq!(record.conventions, None);
        assert_eq!(record.version, None);
        assert_eq!(record.development, None);
        assert_eq!(record.permissions, None);
    }

    #[test]
    fn numeric_version_is_rendered_as_text() {
        let record = metadata_from_header(&header("version: 1.0\n"));
        assert_eq!(record.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn architecture_as_scalar_yields_empty_architecture() {
        let record = metadata_from_header(&header("architecture: MVC\n"));
        assert_eq!(record.architecture.style, "");
        assert!(record.architecture.components.is_empty());
        assert!(record.architecture.patterns.is_empty());
    }

    #[test]
    fn nested_blocks_and_unknown_keys_are_preserved() {
        let record = metadata_from_header(&header(
            "module-name: auth\n\
             development:\n  setup-steps:\n    - cargo build\n\
             permissions:\n  allow-ai-modifications: false\n  reviewers: [alice]\n\
             quality-assurance:\n  - Coverage: 80%\n",
        ));

        let development = record.development.expect("development");
        assert_eq!(development["setup-steps"][0], "cargo build");

        let permissions = record.permissions.expect("permissions");
        assert_eq!(permissions.allow_ai_modifications, Some(false));
        assert_eq!(permissions.extra["reviewers"], serde_json::json!(["alice"]));

        assert_eq!(
            record.extensions["quality-assurance"],
            serde_json::json!([{ "Coverage": "80%" }])
        );
        assert!(!record.extensions.contains_key("module-name"));
    }

    #[test]
    fn non_scalar_required_fields_are_dropped() {
        let record = metadata_from_header(&header(
            "module-name: [a, b]\ndescription: {x: y}\nversion: 1.0.0\ntechnologies: [Rust]\n",
        ));

        assert_eq!(record.module_name, None);
        assert_eq!(record.description, None);
        assert_eq!(record.version.as_deref(), Some("1.0.0"));
        assert_eq!(record.technologies, Some(vec!["Rust".to_string()]));
        assert!(!record.extensions.contains_key("module-name"));
        assert!(!record.extensions.contains_key("description"));
    }
}
