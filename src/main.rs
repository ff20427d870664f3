use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dotcontext_core::config::base_dir_from_env_value;
use dotcontext_core::constants::ROOT_ENV_VAR;
use dotcontext_core::{ContextConfig, ContextService};
use dotcontext_mcp_server::McpServer;

/// Main entry point for the dotcontext MCP server
///
/// Serves the context tools over stdin/stdout until the client closes its input or the
/// process receives Ctrl-C.
///
/// # Environment Variables
/// - `DOTCONTEXT_ROOT`: Base directory that tool paths are resolved against (default: the
///   installation root derived from the executable's location)
/// - `RUST_LOG`: Log filter; logs are written to stderr
///
/// # Returns
/// * `Ok(())` - If the server stops cleanly
/// * `Err(anyhow::Error)` - If start-up or the stdio transport fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dotcontext=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exe = std::env::current_exe().context("cannot locate the server executable")?;
    let base_dir = base_dir_from_env_value(std::env::var(ROOT_ENV_VAR).ok(), install_root(&exe));
    let config = ContextConfig::new(base_dir)?;
    tracing::info!("base directory: {}", config.base_dir().display());

    let server = McpServer::new(ContextService::new(config));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = server.serve(stdin, stdout) => {
            result.context("stdio transport failed")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    Ok(())
}

/// Installation root for an executable at `exe`.
///
/// An installed binary lives in `<root>/bin/`; a cargo build lives in `<root>/target/<profile>/`.
fn install_root(exe: &Path) -> PathBuf {
    let exe_dir = exe.parent().unwrap_or(Path::new("."));
    let parent = exe_dir.parent().unwrap_or(exe_dir);

    match (parent.file_name(), parent.parent()) {
        (Some(name), Some(root)) if name == "target" => root.to_path_buf(),
        _ => parent.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_binary_root_is_above_bin() {
        assert_eq!(
            install_root(Path::new("/opt/dotcontext/bin/dotcontext-mcp")),
            PathBuf::from("/opt/dotcontext")
        );
    }

    #[test]
    fn cargo_build_root_is_above_target() {
        assert_eq!(
            install_root(Path::new("/src/dotcontext/target/release/dotcontext-mcp")),
            PathBuf::from("/src/dotcontext")
        );
    }

    #[test]
    fn env_override_wins_over_install_root() {
        let fallback = install_root(Path::new("/opt/dotcontext/bin/dotcontext-mcp"));
        assert_eq!(
            base_dir_from_env_value(Some("/srv/project".into()), fallback.clone()),
            PathBuf::from("/srv/project")
        );
        assert_eq!(base_dir_from_env_value(None, fallback.clone()), fallback);
    }
}
