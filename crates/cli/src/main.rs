use clap::{Parser, Subcommand, ValueEnum};
use dotcontext_core::constants::{DEFAULT_CONTEXT_DIR, IGNORE_FILENAME, INDEX_FILENAME};
use dotcontext_core::{
    CollectedContext, ContextConfig, ContextService, LintReport, ScaffoldReport, StructureReport,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dotcontext")]
#[command(about = "CLI tool for working with .context directories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a .context directory structure
    Validate {
        /// Path to the .context directory
        path: PathBuf,
    },
    /// Show the context described by a .context directory
    Context {
        /// Path to the .context directory
        path: PathBuf,
        /// Output raw JSON instead of formatted text
        #[arg(short, long)]
        raw: bool,
    },
    /// List available Mermaid diagrams
    Diagrams {
        /// Path to the .context directory
        path: PathBuf,
        /// Include diagram content
        #[arg(short, long)]
        content: bool,
    },
    /// Initialise a new context directory and ignore file
    Init {
        /// Path of the .context directory to create
        #[arg(default_value = DEFAULT_CONTEXT_DIR)]
        path: PathBuf,
    },
    /// Lint the metadata document of a .context directory
    Lint {
        /// Path to the .context directory
        #[arg(default_value = DEFAULT_CONTEXT_DIR)]
        path: PathBuf,
        /// Rewrite the document to fix what can be fixed
        #[arg(long)]
        fix: bool,
    },
    /// Generate a single context artefact
    Generate {
        /// Which artefact to generate
        #[arg(short = 't', long = "type", value_enum, default_value_t = GenerateTarget::Context)]
        target: GenerateTarget,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GenerateTarget {
    /// The .context directory and its index.md
    Context,
    /// The .contextignore file
    Ignore,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries command output, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let service = ContextService::new(ContextConfig::from_current_dir()?);

    match cli.command {
        Commands::Validate { path } => {
            let report = service.check_structure(&path).await;
            if report.valid {
                print!("{}", render_structure_report(&report));
                Ok(ExitCode::SUCCESS)
            } else {
                eprint!("{}", render_structure_report(&report));
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Context { path, raw } => {
            let context = service.collect(&path).await?;
            if raw {
                println!("{}", serde_json::to_string_pretty(&context)?);
            } else {
                print!("{}", render_context(&context));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Diagrams { path, content } => {
            let names = service.diagrams(&path).await;
            let contents = if content {
                service.diagram_contents(&path).await
            } else {
                BTreeMap::new()
            };
            print!("{}", render_diagrams(&names, &contents));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { path } => {
            let report = service.scaffold(&path).await?;
            print!("{}", render_scaffold_report(&report));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lint { path, fix } => {
            let report = service.linter(&path).lint(fix).await?;
            print!("{}", render_lint_report(&report, fix));
            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Generate { target } => {
            let generator = service.scaffold_generator(DEFAULT_CONTEXT_DIR);
            let message = match target {
                GenerateTarget::Context => {
                    if generator.create_metadata_document().await? {
                        format!("Generated {}/{}", DEFAULT_CONTEXT_DIR, INDEX_FILENAME)
                    } else {
                        format!("{}/{} already exists", DEFAULT_CONTEXT_DIR, INDEX_FILENAME)
                    }
                }
                GenerateTarget::Ignore => {
                    if generator.create_ignore_file().await? {
                        format!("Generated {}", IGNORE_FILENAME)
                    } else {
                        format!("{} already exists", IGNORE_FILENAME)
                    }
                }
            };
            println!("{}", message);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn render_structure_report(report: &StructureReport) -> String {
    if report.valid {
        return "Context directory is valid\n".to_string();
    }
    let mut out = String::from("Context directory validation failed:\n");
    for error in &report.errors {
        let _ = writeln!(out, "  - {}", error);
    }
    out
}

fn render_context(context: &CollectedContext) -> String {
    let metadata = &context.metadata;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Module: {}",
        metadata.module_name.as_deref().unwrap_or("")
    );
    let _ = writeln!(
        out,
        "Description: {}",
        metadata.description.as_deref().unwrap_or("")
    );
    let _ = writeln!(out, "\nArchitecture:");
    let _ = writeln!(out, "Style: {}", metadata.architecture.style);

    let _ = writeln!(out, "\nComponents:");
    for component in &metadata.architecture.components {
        let _ = writeln!(out, "  - {}: {}", component.name, component.description);
    }

    let _ = writeln!(out, "\nPatterns:");
    for pattern in &metadata.architecture.patterns {
        let _ = writeln!(out, "  - {}: {}", pattern.name, pattern.usage);
    }

    if !context.related_modules.is_empty() {
        let _ = writeln!(out, "\nRelated Modules:");
        for module in &context.related_modules {
            let _ = writeln!(out, "  - {} ({})", module.name, module.path);
            if let Some(error) = &module.error {
                let _ = writeln!(out, "    Error: {}", error);
            }
        }
    }

    if !context.diagrams.is_empty() {
        let _ = writeln!(out, "\nDiagrams:");
        for name in context.diagrams.keys() {
            let _ = writeln!(out, "  - {}", name);
        }
    }

    out
}

fn render_diagrams(names: &[String], contents: &BTreeMap<String, String>) -> String {
    if names.is_empty() {
        return "No diagrams found\n".to_string();
    }

    let mut out = String::from("Available diagrams:\n");
    for name in names {
        let _ = writeln!(out, "  - {}", name);
        if let Some(content) = contents.get(name) {
            let _ = writeln!(out, "\nContent:\n{}\n", content);
        }
    }
    out
}

fn render_scaffold_report(report: &ScaffoldReport) -> String {
    if report.already_present() {
        return "Context structure already exists\n".to_string();
    }

    let mut out = String::new();
    if report.dir_created {
        let _ = writeln!(out, "Created context directory");
    }
    if report.index_created {
        let _ = writeln!(out, "Generated {} with default content", INDEX_FILENAME);
    }
    if report.ignore_created {
        let _ = writeln!(out, "Generated {} with default patterns", IGNORE_FILENAME);
    }
    out
}

fn render_lint_report(report: &LintReport, fix: bool) -> String {
    if report.issues.is_empty() {
        return "No lint issues found\n".to_string();
    }

    let mut out = format!("Found {} issue(s):\n", report.issues.len());
    for issue in &report.issues {
        let _ = writeln!(out, "  - {}", issue);
        if let Some(suggestion) = &issue.suggestion {
            let _ = writeln!(out, "    Suggestion: {}", suggestion);
        }
    }
    if fix {
        let _ = writeln!(out, "Fixed {} of {} issue(s)", report.fixed_count, report.issues.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use dotcontext_core::{Component, LintIssue, MetadataRecord, Pattern};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn init_and_lint_default_to_context_dir() {
        let cli = Cli::try_parse_from(["dotcontext", "lint", "--fix"]).unwrap();
        match cli.command {
            Commands::Lint { path, fix } => {
                assert_eq!(path, PathBuf::from(".context"));
                assert!(fix);
            }
            _ => panic!("expected lint"),
        }

        let cli = Cli::try_parse_from(["dotcontext", "init"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { path } if path == PathBuf::from(".context")));
    }

    #[test]
    fn short_flags_are_accepted() {
        let cli = Cli::try_parse_from(["dotcontext", "context", "x", "-r"]).unwrap();
        assert!(matches!(cli.command, Commands::Context { raw: true, .. }));

        let cli = Cli::try_parse_from(["dotcontext", "diagrams", "x", "-c"]).unwrap();
        assert!(matches!(cli.command, Commands::Diagrams { content: true, .. }));

        let cli = Cli::try_parse_from(["dotcontext", "generate", "-t", "ignore"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Generate {
                target: GenerateTarget::Ignore
            }
        ));
    }

    #[test]
    fn validate_requires_a_path() {
        assert!(Cli::try_parse_from(["dotcontext", "validate"]).is_err());
    }

    #[test]
    fn structure_report_lists_errors() {
        let report = StructureReport::from_errors(vec!["Missing index.md file".into()]);
        assert_eq!(
            render_structure_report(&report),
            "Context directory validation failed:\n  - Missing index.md file\n"
        );
        assert_eq!(
            render_structure_report(&StructureReport::from_errors(Vec::new())),
            "Context directory is valid\n"
        );
    }

    #[test]
    fn context_summary_skips_empty_sections() {
        let mut context = CollectedContext {
            metadata: MetadataRecord {
                module_name: Some("auth".into()),
                description: Some("Login".into()),
                ..Default::default()
            },
            related_modules: Vec::new(),
            diagrams: BTreeMap::new(),
            unstructured_body: String::new(),
            source_path: "/tmp/.context/index.md".into(),
        };
        context.metadata.architecture.style = "Layered".into();
        context.metadata.architecture.components.push(Component {
            name: "Api".into(),
            description: "HTTP edge".into(),
        });
        context.metadata.architecture.patterns.push(Pattern {
            name: "CQRS".into(),
            usage: "Reads".into(),
        });

        let text = render_context(&context);
        assert!(text.starts_with("Module: auth\nDescription: Login\n"));
        assert!(text.contains("Style: Layered"));
        assert!(text.contains("  - Api: HTTP edge"));
        assert!(text.contains("  - CQRS: Reads"));
        assert!(!text.contains("Related Modules"));
        assert!(!text.contains("Diagrams"));

        context.diagrams.insert("flow.mmd".into(), "graph TD".into());
        assert!(render_context(&context).contains("Diagrams:\n  - flow.mmd\n"));
    }

    #[test]
    fn diagrams_listing_handles_empty_and_content() {
        assert_eq!(render_diagrams(&[], &BTreeMap::new()), "No diagrams found\n");

        let names = vec!["a.mmd".to_string()];
        let mut contents = BTreeMap::new();
        contents.insert("a.mmd".to_string(), "graph TD".to_string());
        assert_eq!(
            render_diagrams(&names, &BTreeMap::new()),
            "Available diagrams:\n  - a.mmd\n"
        );
        assert!(render_diagrams(&names, &contents).contains("Content:\ngraph TD\n"));
    }

    #[test]
    fn scaffold_report_mentions_created_artefacts() {
        let nothing = ScaffoldReport::default();
        assert_eq!(
            render_scaffold_report(&nothing),
            "Context structure already exists\n"
        );

        let only_ignore = ScaffoldReport {
            ignore_created: true,
            ..Default::default()
        };
        assert_eq!(
            render_scaffold_report(&only_ignore),
            "Generated .contextignore with default patterns\n"
        );
    }

    #[test]
    fn lint_report_shows_location_and_fix_count() {
        let report = LintReport {
            issues: vec![LintIssue {
                message: "Missing required field: version".into(),
                file: "index.md".into(),
                line: 2,
                suggestion: Some("Add \"version: your-value-here\"".into()),
            }],
            fixed_count: 1,
        };

        let text = render_lint_report(&report, true);
        assert!(text.contains("Found 1 issue(s)"));
        assert!(text.contains("index.md:2"));
        assert!(text.contains("Suggestion: Add \"version: your-value-here\""));
        assert!(text.ends_with("Fixed 1 of 1 issue(s)\n"));
        assert!(!render_lint_report(&report, false).contains("Fixed"));
        assert_eq!(
            render_lint_report(&LintReport::default(), false),
            "No lint issues found\n"
        );
    }
}
