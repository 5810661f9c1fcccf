//! # Command Line Interface
//!
//! Loads a routing model from disk, compiles it and prints the result.

pub mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::envoy::listener::build_routes;
use crate::envoy::{CompiledConfig, ConfigCompiler, RenderedRoute};
use crate::model::RoutingModel;
use crate::observability::{init_logging, log_settings};
use output::{print_output, print_table_header, truncate, OutputFormat};

#[derive(Parser)]
#[command(name = "routeplane")]
#[command(about = "Compile routing models into Envoy v1 listener configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile every listener and print the configuration
    Compile {
        /// Routing model file (.json, or YAML otherwise)
        #[arg(short, long)]
        model: PathBuf,

        /// Output format: json or yaml
        #[arg(short, long)]
        format: Option<String>,

        /// Compile listeners on parallel tasks
        #[arg(long)]
        parallel: bool,

        /// Skip listeners that fail to compile instead of aborting
        #[arg(long)]
        isolate: bool,
    },

    /// Print the route table in evaluation order
    Routes {
        /// Routing model file (.json, or YAML otherwise)
        #[arg(short, long)]
        model: PathBuf,

        /// Output format: json or yaml
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Compile each listener in isolation and report its status
    Check {
        /// Routing model file (.json, or YAML otherwise)
        #[arg(short, long)]
        model: PathBuf,
    },
}

/// Run CLI commands
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.settings.as_deref())?;
    if cli.verbose {
        settings.observability.log_level = "debug".to_string();
    }
    if let Err(e) = init_logging(&settings.observability) {
        eprintln!("Warning: {}", e);
    }
    log_settings(&settings);

    match cli.command {
        Commands::Compile { model, format, parallel, isolate } => {
            let format = resolve_format(format.as_deref(), &settings)?;
            let parallel = parallel || settings.compiler.parallel;
            let isolate = isolate || settings.compiler.isolate_listeners;
            let config = compile_model(&model, parallel, isolate).await?;
            print_output(&config, format)?;
        }
        Commands::Routes { model, format } => {
            let format = resolve_format(format.as_deref(), &settings)?;
            let routes = route_table(&model)?;
            print_output(&routes, format)?;
        }
        Commands::Check { model } => check_model(&model)?,
    }

    Ok(())
}

fn resolve_format(flag: Option<&str>, settings: &Settings) -> Result<OutputFormat> {
    flag.unwrap_or(settings.compiler.default_format.as_str()).parse()
}

fn load_model(path: &Path) -> Result<RoutingModel> {
    RoutingModel::from_path(path)
        .with_context(|| format!("Failed to load routing model from {}", path.display()))
}

/// Compile a model file according to the requested mode
pub async fn compile_model(path: &Path, parallel: bool, isolate: bool) -> Result<CompiledConfig> {
    let model = load_model(path)?;
    let compiler = ConfigCompiler::new();

    if !parallel && !isolate {
        return Ok(compiler.compile(&model)?);
    }

    let outcomes = if parallel {
        compiler.compile_parallel(Arc::new(model)).await
    } else {
        compiler.compile_each(&model)
    };

    if isolate {
        return Ok(ConfigCompiler::collect_successes(outcomes));
    }

    let listeners = outcomes
        .into_iter()
        .map(|outcome| outcome.result)
        .collect::<crate::Result<Vec<_>>>()?;
    Ok(CompiledConfig { listeners })
}

/// Render the shared route table of a model file in evaluation order
pub fn route_table(path: &Path) -> Result<Vec<RenderedRoute>> {
    let model = load_model(path)?;
    Ok(build_routes(&model)?)
}

/// Compile each listener of a model file in isolation and print a status
/// table; fails when any listener did not compile
pub fn check_model(path: &Path) -> Result<()> {
    let model = load_model(path)?;
    let outcomes = ConfigCompiler::new().compile_each(&model);

    print_table_header(&[("LISTENER", 10), ("ADDRESS", 24), ("ROUTES", 8), ("STATUS", 40)]);

    let mut failed = 0;
    for outcome in &outcomes {
        let (address, routes, status) = match &outcome.result {
            Ok(record) => (record.address.clone(), record.routes().len().to_string(), "ok".to_string()),
            Err(e) => {
                failed += 1;
                ("-".to_string(), "-".to_string(), truncate(&e.to_string(), 40))
            }
        };
        println!("{:<10} {:<24} {:<8} {}", outcome.index, address, routes, status);
    }

    if failed > 0 {
        anyhow::bail!("{} of {} listeners failed to compile", failed, outcomes.len());
    }
    Ok(())
}
