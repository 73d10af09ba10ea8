//! CLI binary for seedplan: plan, report on, and check generation-unit order.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use seedplan_core::config::SeedplanConfig;
use seedplan_core::manifest::{self, Manifest};
use seedplan_core::relations::CachedRelations;
use seedplan_core::unit::PlanContext;
use seedplan_sched::Orchestrator;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "seedplan", about = "Dependency-ordered planning for generation units")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Manifest file (defaults to .seedplan/manifest.json under the project root)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Context value as key=value (repeatable). Values are parsed as JSON when
    /// possible, otherwise kept as strings.
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    set: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the execution order
    Plan {
        /// Fall back to declaration order instead of failing
        #[arg(long)]
        safe: bool,

        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a per-level diagnostic report
    Report,

    /// Check the dependency graph for cycles
    Check,
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let manifest_path = cli
        .manifest
        .clone()
        .unwrap_or_else(|| manifest::manifest_file(&project_root));
    let context = parse_context(&cli.set)?;

    let config = SeedplanConfig::load(&project_root)?;
    let manifest = load_manifest(&manifest_path)?;
    let orchestrator = build_orchestrator(&config, &manifest);

    match cli.command {
        Commands::Plan { safe, json } => cmd_plan(&orchestrator, &manifest, &context, safe, json),
        Commands::Report => {
            print!("{}", orchestrator.report(&manifest.units, &context));
            Ok(())
        }
        Commands::Check => cmd_check(&orchestrator, &manifest, &context),
    }
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        anyhow::bail!(
            "No manifest found at {}. Pass --manifest or create .seedplan/manifest.json.",
            path.display()
        );
    }
    manifest::load(path)
}

fn build_orchestrator(config: &SeedplanConfig, manifest: &Manifest) -> Orchestrator {
    Orchestrator::from_config(config, Arc::new(CachedRelations::new(manifest.catalog())))
}

/// Parse `key=value` assignments into a plan context.
fn parse_context(assignments: &[String]) -> Result<PlanContext> {
    let mut context = PlanContext::new();
    for raw in assignments {
        let Some((key, value)) = raw.split_once('=') else {
            anyhow::bail!("invalid --set `{raw}`: expected KEY=VALUE");
        };
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("invalid --set `{raw}`: empty key");
        }
        let value = value.trim();
        let parsed =
            serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()));
        context.insert(key, parsed);
    }
    Ok(context)
}

fn cmd_plan(
    orchestrator: &Orchestrator,
    manifest: &Manifest,
    context: &PlanContext,
    safe: bool,
    json: bool,
) -> Result<()> {
    if safe {
        let units = orchestrator.safe_plan(&manifest.units, context);
        if json {
            let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
            println!("{}", serde_json::to_string_pretty(&names)?);
        } else {
            for (i, unit) in units.iter().enumerate() {
                println!("{:>3}. {}", i + 1, unit.name);
            }
        }
        return Ok(());
    }

    let plan = orchestrator.plan(&manifest.units, context)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        let mut position = 0;
        for level in &plan.levels {
            for unit in &level.units {
                position += 1;
                println!("{:>3}. {} (level {})", position, unit.name, level.level);
            }
        }
        let summary = plan.summary();
        eprintln!(
            "\n{} unit(s), {} level(s), {} edge(s)",
            summary.unit_count, summary.level_count, summary.edge_count
        );
    }
    Ok(())
}

fn cmd_check(orchestrator: &Orchestrator, manifest: &Manifest, context: &PlanContext) -> Result<()> {
    match orchestrator.detect_cycle(&manifest.units, context)? {
        Some(cycle) => {
            println!("CYCLE: {cycle}");
            anyhow::bail!("dependency cycle across {} unit(s)", cycle.len());
        }
        None => {
            println!("OK: no dependency cycles among {} unit(s)", manifest.units.len());
            Ok(())
        }
    }
}
