//! `copilot`: command-line front end for the process-copilot engine.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use colored::Colorize;
use pc_core::agents::AgentFactory;
use pc_core::config::{load_config, AppConfig};
use pc_core::knowledge::KnowledgeStore;
use pc_core::logging::init_logging;
use pc_core::validation::validate;
use pc_core::JobManager;
use pc_protocol::{Job, JobState, ProcessDefinition, ProcessMap, StepStatus, SubmitRequest};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "copilot")]
#[command(about = "Design business processes with generative agents", long_about = None)]
#[command(version)]
struct Cli {
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a request and follow the job until it finishes
    Run {
        /// What to design, modify or analyze
        prompt: String,

        /// Project root containing `.copilot/`
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Knowledge source id to attach (repeatable)
        #[arg(short, long = "knowledge")]
        knowledge: Vec<String>,

        /// Current process map JSON, for modification and analysis
        #[arg(long)]
        current: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 200)]
        poll_ms: u64,
    },

    /// Turn an outline JSON file straight into a process map job
    Transform {
        definition: PathBuf,

        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[arg(long, default_value_t = 200)]
        poll_ms: u64,
    },

    /// Check a process map JSON file for structural errors
    Validate { map: PathBuf },

    /// Audit a `{ "nodes": [...], "edges": [...] }` snapshot
    Analyze {
        snapshot: PathBuf,

        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs);

    match cli.command {
        Commands::Run {
            prompt,
            root,
            knowledge,
            current,
            poll_ms,
        } => {
            let manager = build_manager(&root).await?;
            let mut request = SubmitRequest::new(prompt).with_knowledge(knowledge);
            if let Some(path) = current {
                request = request.with_current_process(read_json::<ProcessMap>(&path)?);
            }
            let job_id = manager.submit(request).await;
            follow(&manager, job_id, poll_ms).await
        }
        Commands::Transform {
            definition,
            root,
            poll_ms,
        } => {
            let manager = build_manager(&root).await?;
            let definition = read_json::<ProcessDefinition>(&definition)?;
            let job_id = manager.submit_transformation(definition).await;
            follow(&manager, job_id, poll_ms).await
        }
        Commands::Validate { map } => {
            let map = read_json::<ProcessMap>(&map)?;
            validate(&map).map_err(|e| eyre!("{}", e))?;
            println!(
                "{} {} ({} activities)",
                "✓".green(),
                "Process map is structurally valid".bold(),
                map.activities.len()
            );
            Ok(())
        }
        Commands::Analyze { snapshot, root } => {
            let manager = build_manager(&root).await?;
            let graph = read_json::<serde_json::Value>(&snapshot)?;
            let results = manager.analyze_graph(&graph).await?;
            if results.is_empty() {
                eprintln!("{}", "No findings".green());
            } else {
                eprintln!("{} finding(s)", results.len().to_string().yellow());
            }
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
    }
}

async fn build_manager(root: &Path) -> Result<JobManager> {
    let AppConfig {
        settings,
        agents,
        knowledge,
    } = load_config(root)
        .await
        .wrap_err_with(|| format!("Failed to load configuration from {}", root.display()))?;

    let agent_set = if agents.is_empty() {
        tracing::warn!("No agent profiles configured, using built-in mock agents");
        AgentFactory::mock_set()
    } else {
        AgentFactory::build(&agents, root)?
    };

    Ok(JobManager::new(agent_set, settings, KnowledgeStore::new(knowledge)))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("Invalid JSON in {}", path.display()))
}

/// Poll until the job is terminal, printing step changes to stderr and
/// the final snapshot to stdout.
async fn follow(manager: &JobManager, job_id: Uuid, poll_ms: u64) -> Result<()> {
    eprintln!("{} {}", "Job".bold(), job_id.to_string().cyan());

    let mut last_version = None;
    let mut seen: HashMap<String, StepStatus> = HashMap::new();

    let job = loop {
        let job = manager
            .poll(job_id)
            .await
            .ok_or_else(|| eyre!("Job {} disappeared", job_id))?;

        if last_version != Some(job.version) {
            last_version = Some(job.version);
            print_progress(&job, &mut seen);
        }
        if job.state.is_terminal() {
            break job;
        }
        tokio::time::sleep(Duration::from_millis(poll_ms.max(1))).await;
    };

    println!("{}", serde_json::to_string_pretty(&job)?);

    match job.state {
        JobState::Failed => Err(eyre!("Job failed: {}", job.message)),
        _ => {
            eprintln!("{} {}", "✓".green(), job.message);
            Ok(())
        }
    }
}

fn print_progress(job: &Job, seen: &mut HashMap<String, StepStatus>) {
    for step in &job.progress_steps {
        if seen.get(&step.id) == Some(&step.status) {
            continue;
        }
        seen.insert(step.id.clone(), step.status);

        let marker = match step.status {
            StepStatus::Pending => "·".dimmed(),
            StepStatus::InProgress => "…".yellow(),
            StepStatus::Completed => "✓".green(),
            StepStatus::Failed => "✗".red(),
        };
        eprintln!("  {} {}", marker, step.label);
    }
}
