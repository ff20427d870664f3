//! Text rendering of tool results.

use dotcontext_core::CollectedContext;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Summary of a collected context for a human reader.
///
/// Empty component and pattern sections are left out, and the prose body is appended under
/// the path it was read from.
pub fn format_context(context: &CollectedContext) -> String {
    let metadata = &context.metadata;
    let architecture = &metadata.architecture;
    let mut output = String::new();

    let _ = write!(
        output,
        "Module: {}\n\n",
        metadata.module_name.as_deref().unwrap_or_default()
    );
    let _ = write!(
        output,
        "Description: {}\n\n",
        metadata.description.as_deref().unwrap_or_default()
    );

    output.push_str("Architecture:\n");
    let _ = write!(output, "Style: {}\n\n", architecture.style);

    if !architecture.components.is_empty() {
        output.push_str("Components:\n");
        for component in &architecture.components {
            push_bullet(&mut output, &component.name, &component.description);
        }
        output.push('\n');
    }

    if !architecture.patterns.is_empty() {
        output.push_str("Patterns:\n");
        for pattern in &architecture.patterns {
            push_bullet(&mut output, &pattern.name, &pattern.usage);
        }
        output.push('\n');
    }

    if !context.unstructured_body.is_empty() {
        let source = if context.source_path.is_empty() {
            "unknown path"
        } else {
            context.source_path.as_str()
        };
        let _ = writeln!(output, "Unstructured Content ({}):", source);
        output.push_str(&context.unstructured_body);
    }

    output
}

/// Listing of diagram names, with fenced Mermaid blocks for any supplied contents.
pub fn format_diagrams(names: &[String], contents: Option<&BTreeMap<String, String>>) -> String {
    if names.is_empty() {
        return "No diagrams found in the context directory.".to_string();
    }

    let mut output = String::from("Available Diagrams\n==================\n\n");
    for name in names {
        let _ = writeln!(output, "• {}", name);
        if let Some(content) = contents.and_then(|c| c.get(name)) {
            let _ = write!(output, "\nContent:\n```mermaid\n{}\n```\n\n", content);
        }
    }
    output
}

fn push_bullet(output: &mut String, name: &str, detail: &str) {
    if detail.is_empty() {
        let _ = writeln!(output, "• {}", name);
    } else {
        let _ = writeln!(output, "• {}: {}", name, detail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotcontext_core::{Component, MetadataRecord, Pattern};

    fn context() -> CollectedContext {
        let mut metadata = MetadataRecord {
            module_name: Some("auth".into()),
            description: Some("Login and sessions".into()),
            ..Default::default()
        };
        metadata.architecture.style = "Hexagonal".into();
        metadata.architecture.components = vec![
            Component {
                name: "Api".into(),
                description: "HTTP edge".into(),
            },
            Component {
                name: "Store".into(),
                description: String::new(),
            },
        ];
        CollectedContext {
            metadata,
            related_modules: Vec::new(),
            diagrams: BTreeMap::new(),
            unstructured_body: "# Auth\n".into(),
            source_path: "/srv/.context/index.md".into(),
        }
    }

    #[test]
    fn context_summary_lists_sections() {
        let text = format_context(&context());
        assert_eq!(
            text,
            "Module: auth\n\n\
             Description: Login and sessions\n\n\
             Architecture:\n\
             Style: Hexagonal\n\n\
             Components:\n\
             • Api: HTTP edge\n\
             • Store\n\n\
             Unstructured Content (/srv/.context/index.md):\n\
             # Auth\n"
        );
    }

    #[test]
    fn patterns_appear_only_when_present() {
        let mut ctx = context();
        assert!(!format_context(&ctx).contains("Patterns:"));

        ctx.metadata.architecture.patterns.push(Pattern {
            name: "Outbox".into(),
            usage: "Events".into(),
        });
        assert!(format_context(&ctx).contains("Patterns:\n• Outbox: Events\n\n"));
    }

    #[test]
    fn missing_source_path_is_labelled() {
        let mut ctx = context();
        ctx.source_path.clear();
        assert!(format_context(&ctx).contains("Unstructured Content (unknown path):"));
    }

    #[test]
    fn empty_diagram_list_has_fixed_message() {
        assert_eq!(
            format_diagrams(&[], None),
            "No diagrams found in the context directory."
        );
    }

    #[test]
    fn diagram_contents_are_fenced() {
        let names = vec!["flow.mmd".to_string(), "seq.mmd".to_string()];
        let mut contents = BTreeMap::new();
        contents.insert("flow.mmd".to_string(), "graph TD; A-->B".to_string());

        let text = format_diagrams(&names, Some(&contents));
        assert!(text.starts_with("Available Diagrams\n"));
        assert!(text.contains("• flow.mmd\n\nContent:\n```mermaid\ngraph TD; A-->B\n```\n\n"));
        assert!(text.ends_with("• seq.mmd\n"));
    }
}
