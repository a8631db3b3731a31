//! ESO build engine data server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eso_build_engine::aggregate::{aggregate_effects, render_build_md};
use eso_build_engine::api::{create_router, AppState};
use eso_build_engine::config::Config;
use eso_build_engine::data::{
    build_path, sanitize_build_id, Build, DataRoot, PERMAFROST_MARSHAL_ID,
};
use eso_build_engine::display::DisplayClient;
use eso_build_engine::metrics;
use eso_build_engine::utils::shutdown_signal;
use eso_build_engine::validate::build::BuildContext;
use eso_build_engine::validate::{check_build, check_data};

/// ESO build engine data server.
#[derive(Parser, Debug)]
#[command(name = "eso-build-engine")]
#[command(about = "Read-only HTTP API over ESO reference data and builds")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Repository root holding data/ and builds/ (overrides REPO_ROOT).
    #[arg(long)]
    repo_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Repository root (overrides REPO_ROOT).
        #[arg(long)]
        repo_root: Option<PathBuf>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Check id uniqueness, namespaces and effect references across data/.
    CheckData {
        /// Repository root (overrides REPO_ROOT).
        #[arg(long)]
        repo_root: Option<PathBuf>,
    },

    /// Validate one build against the reference data.
    ValidateBuild {
        /// Build id (file stem under builds/).
        #[arg(default_value = PERMAFROST_MARSHAL_ID)]
        id: String,

        /// Repository root (overrides REPO_ROOT).
        #[arg(long)]
        repo_root: Option<PathBuf>,
    },

    /// Print every effect instance a build applies, as JSON.
    AggregateEffects {
        /// Build id (file stem under builds/).
        #[arg(default_value = PERMAFROST_MARSHAL_ID)]
        id: String,

        /// Repository root (overrides REPO_ROOT).
        #[arg(long)]
        repo_root: Option<PathBuf>,
    },

    /// Write a build as a Markdown grid (default: next to the build file).
    ExportBuildMd {
        /// Build id (file stem under builds/).
        #[arg(default_value = PERMAFROST_MARSHAL_ID)]
        id: String,

        /// Output file.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Repository root (overrides REPO_ROOT).
        #[arg(long)]
        repo_root: Option<PathBuf>,
    },

    /// Fetch health and the Permafrost Marshal build from a running server.
    Display {
        /// Server base URL.
        #[arg(long, default_value = "http://localhost:3001")]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("eso_build_engine=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.resolved_command() {
        Command::Serve { port, repo_root } => cmd_serve(port, repo_root).await,
        Command::CheckConfig => cmd_check_config(args.port, args.repo_root),
        Command::CheckData { repo_root } => cmd_check_data(repo_root).await,
        Command::ValidateBuild { id, repo_root } => cmd_validate_build(&id, repo_root).await,
        Command::AggregateEffects { id, repo_root } => cmd_aggregate_effects(&id, repo_root).await,
        Command::ExportBuildMd { id, out, repo_root } => {
            cmd_export_build_md(&id, out, repo_root).await
        }
        Command::Display { base_url } => cmd_display(&base_url).await,
    }
}

impl Args {
    /// The subcommand to run, `serve` when none is given. Top-level `--port`
    /// and `--repo-root` fill in whatever the subcommand leaves unset.
    fn resolved_command(&self) -> Command {
        let port = self.port;
        let root = self.repo_root.clone();
        match self.command.clone() {
            None => Command::Serve { port, repo_root: root },
            Some(Command::Serve { port: p, repo_root }) => Command::Serve {
                port: p.or(port),
                repo_root: repo_root.or(root),
            },
            Some(Command::CheckData { repo_root }) => Command::CheckData {
                repo_root: repo_root.or(root),
            },
            Some(Command::ValidateBuild { id, repo_root }) => Command::ValidateBuild {
                id,
                repo_root: repo_root.or(root),
            },
            Some(Command::AggregateEffects { id, repo_root }) => Command::AggregateEffects {
                id,
                repo_root: repo_root.or(root),
            },
            Some(Command::ExportBuildMd { id, out, repo_root }) => Command::ExportBuildMd {
                id,
                out,
                repo_root: repo_root.or(root),
            },
            Some(other) => other,
        }
    }
}

/// Load configuration with CLI overrides applied.
fn load_config(port: Option<u16>, repo_root: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_with(port, repo_root).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        anyhow::Error::from(e)
    })
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(port: Option<u16>, repo_root: Option<PathBuf>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(port, repo_root)?;

    let root = config.resolved_root();
    info!("Repository root: {}", root.display());

    let mut state = AppState::new(DataRoot::new(root));
    if config.metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => state = state.with_metrics(handle),
            Err(e) => warn!("Metrics recorder not installed: {}", e),
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("ESO Build Engine backend listening on http://localhost:{}", config.port);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config(port: Option<u16>, repo_root: Option<PathBuf>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ESO BUILD ENGINE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c.with_overrides(port, repo_root)
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Repository Root: {}", config.resolved_root().display());
    println!("  Log Level: {}", config.rust_log);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the data-wide integrity check and print the report.
async fn cmd_check_data(repo_root: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(None, repo_root)?;
    let report = check_data(&DataRoot::new(config.resolved_root())).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.status.is_ok() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} integrity error(s)", report.error_count))
    }
}

/// Validate one build and print the report.
async fn cmd_validate_build(id: &str, repo_root: Option<PathBuf>) -> anyhow::Result<()> {
    let safe_id = sanitize_build_id(id);
    if safe_id.is_empty() {
        return Err(anyhow::anyhow!("Invalid build id: {:?}", id));
    }

    let config = load_config(None, repo_root)?;
    let report = check_build(&DataRoot::new(config.resolved_root()), &safe_id).await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.status.is_ok() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} build error(s)", report.error_count))
    }
}

/// Load a build and the reference tables it points into.
async fn load_build_with_context(
    id: &str,
    repo_root: Option<PathBuf>,
) -> anyhow::Result<(DataRoot, Build, BuildContext)> {
    let safe_id = sanitize_build_id(id);
    if safe_id.is_empty() {
        return Err(anyhow::anyhow!("Invalid build id: {:?}", id));
    }

    let config = load_config(None, repo_root)?;
    let store = DataRoot::new(config.resolved_root());

    let context = BuildContext::load(&store)
        .await
        .map_err(|errors| anyhow::anyhow!("Failed to load data: {}", errors.join("; ")))?;
    let build = store.load_build(&safe_id).await?;

    Ok((store, build, context))
}

/// Print the effect instances of one build.
async fn cmd_aggregate_effects(id: &str, repo_root: Option<PathBuf>) -> anyhow::Result<()> {
    let (_, build, context) = load_build_with_context(id, repo_root).await?;
    let effects = aggregate_effects(&build, &context);
    info!(build = %build.id, effects = effects.len(), "Aggregated effects");

    println!("{}", serde_json::to_string_pretty(&effects)?);
    Ok(())
}

/// Render one build to Markdown and write it out.
async fn cmd_export_build_md(
    id: &str,
    out: Option<PathBuf>,
    repo_root: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (store, build, context) = load_build_with_context(id, repo_root).await?;
    let out = out.unwrap_or_else(|| {
        store
            .root()
            .join(build_path(&sanitize_build_id(id)))
            .with_extension("md")
    });

    tokio::fs::write(&out, render_build_md(&build, &context)).await?;
    info!("Wrote Markdown to {}", out.display());
    Ok(())
}

/// Fetch and print the display page.
async fn cmd_display(base_url: &str) -> anyhow::Result<()> {
    let client = DisplayClient::new(base_url)?;
    let page = client.load().await;
    print!("{}", page.render());
    Ok(())
}
