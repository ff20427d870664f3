//! Tool catalogue and dispatch.
//!
//! Every tool takes a context directory path that defaults to `.context` and is resolved
//! against the server's base directory.

use crate::format::{format_context, format_diagrams};
use dotcontext_core::constants::DEFAULT_CONTEXT_DIR;
use dotcontext_core::{ContextError, ContextService};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const TOOL_INIT: &str = "init";
pub const TOOL_VALIDATE: &str = "validate";
pub const TOOL_CONTEXT: &str = "context";
pub const TOOL_DIAGRAMS: &str = "diagrams";

const PATH_DESCRIPTION: &str =
    "Path to the .context directory (defaults to .context in the server's root directory)";

/// Errors raised while running a tool. All of them are reported to the client as tool output.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid {tool} arguments: {reason}")]
    InvalidArguments { tool: &'static str, reason: String },

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("failed to serialise tool output: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A tool as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn default_path() -> String {
    DEFAULT_CONTEXT_DIR.to_string()
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    #[serde(default = "default_path")]
    path: String,
}

#[derive(Debug, Deserialize)]
struct ContextArgs {
    #[serde(default = "default_path")]
    path: String,
    #[serde(default)]
    raw: bool,
}

#[derive(Debug, Deserialize)]
struct DiagramsArgs {
    #[serde(default = "default_path")]
    path: String,
    #[serde(default)]
    content: bool,
}

/// Definitions of every tool the server exposes.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: TOOL_INIT,
            description: "Initialize new context directory and ignore file",
            input_schema: path_schema(json!({})),
        },
        ToolDefinition {
            name: TOOL_VALIDATE,
            description: "Validate a .context directory structure and contents",
            input_schema: path_schema(json!({})),
        },
        ToolDefinition {
            name: TOOL_CONTEXT,
            description: "Get context information from index.md including related modules",
            input_schema: path_schema(json!({
                "raw": {
                    "type": "boolean",
                    "description": "Output raw JSON instead of formatted text",
                    "default": false
                }
            })),
        },
        ToolDefinition {
            name: TOOL_DIAGRAMS,
            description: "List available Mermaid diagrams",
            input_schema: path_schema(json!({
                "content": {
                    "type": "boolean",
                    "description": "Include diagram content",
                    "default": false
                }
            })),
        },
    ]
}

fn path_schema(extra: Value) -> Value {
    let mut properties = json!({
        "path": {
            "type": "string",
            "description": PATH_DESCRIPTION,
            "default": DEFAULT_CONTEXT_DIR
        }
    });
    if let (Some(properties), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        properties.extend(extra);
    }
    json!({
        "type": "object",
        "properties": properties
    })
}

/// Run the tool `name` and return its text output.
///
/// # Errors
///
/// - `ToolError::UnknownTool` for a name not in [`tool_definitions`].
/// - `ToolError::InvalidArguments` when `arguments` is not an object of the expected shape.
/// - `ToolError::Context` when the underlying operation fails.
pub async fn call_tool(
    service: &ContextService,
    name: &str,
    arguments: Option<Value>,
) -> Result<String, ToolError> {
    match name {
        TOOL_INIT => {
            let args: PathArgs = parse_args(TOOL_INIT, arguments)?;
            let report = service.scaffold(&args.path).await?;
            Ok(serde_json::to_string_pretty(&json!({
                "success": true,
                "dirCreated": report.dir_created,
                "indexCreated": report.index_created,
                "ignoreCreated": report.ignore_created,
            }))?)
        }
        TOOL_VALIDATE => {
            let args: PathArgs = parse_args(TOOL_VALIDATE, arguments)?;
            let report = service.check_structure(&args.path).await;
            Ok(serde_json::to_string_pretty(&report)?)
        }
        TOOL_CONTEXT => {
            let args: ContextArgs = parse_args(TOOL_CONTEXT, arguments)?;
            let context = service.collect(&args.path).await?;
            if args.raw {
                Ok(serde_json::to_string_pretty(&context)?)
            } else {
                Ok(format_context(&context))
            }
        }
        TOOL_DIAGRAMS => {
            let args: DiagramsArgs = parse_args(TOOL_DIAGRAMS, arguments)?;
            let names = service.diagrams(&args.path).await;
            let contents = if args.content && !names.is_empty() {
                Some(service.diagram_contents(&args.path).await)
            } else {
                None
            };
            Ok(format_diagrams(&names, contents.as_ref()))
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

/// Missing arguments mean "all defaults"; anything else must deserialise into `T`.
fn parse_args<T: DeserializeOwned>(
    tool: &'static str,
    arguments: Option<Value>,
) -> Result<T, ToolError> {
    let arguments = match arguments {
        None | Some(Value::Null) => json!({}),
        Some(value @ Value::Object(_)) => value,
        Some(_) => {
            return Err(ToolError::InvalidArguments {
                tool,
                reason: "arguments must be an object".to_string(),
            })
        }
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool,
        reason: e.to_string(),
    })
}
