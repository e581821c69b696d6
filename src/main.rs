use anyhow::{Context, Result};
use quay_pipeline::{
    cli::{
        commands::{JobsCommand, RunCommand, ValidateCommand},
        output::*,
        Cli, Command,
    },
    core::settings::Settings,
    execution::{ExecutionEvent, LoadedPipeline, PipelineEngine},
    gateway::{GatewayConfig, QuayHttpGateway},
    ActionRegistry,
};
use std::path::Path;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd, cli.settings.as_deref()).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::Jobs(cmd) => list_jobs(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand, settings_file: Option<&Path>) -> Result<()> {
    let mut settings = Settings::load(settings_file).context("Failed to load settings")?;
    settings
        .apply(cmd.api.clone().into())
        .context("Invalid API settings")?;
    let gateway_config =
        GatewayConfig::from_settings(&settings.api).context("Incomplete API settings")?;
    let gateway = QuayHttpGateway::new(gateway_config).context("Failed to create API client")?;

    let engine = PipelineEngine::with_builtin_jobs(Arc::new(gateway));

    let loaded = match engine.load(&cmd.file, cmd.inputs.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("{} Failed to load pipeline:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    };

    // Console rendering; JSON mode keeps stdout for the final document
    let progress = if cmd.json || cmd.no_progress {
        None
    } else {
        Some(create_progress_bar(loaded.pipeline.steps.len()))
    };
    if !cmd.json {
        println!(
            "{} Loaded pipeline: {}\n",
            INFO,
            style(&loaded.pipeline.name).bold()
        );
        let bar = progress.clone();
        engine
            .add_event_handler(move |event| {
                let line = format_execution_event(&event);
                let step_done = matches!(
                    event,
                    ExecutionEvent::StepCompleted { .. }
                        | ExecutionEvent::StepFailed { .. }
                        | ExecutionEvent::StepSkipped { .. }
                );
                match &bar {
                    Some(bar) => {
                        bar.suspend(|| println!("{}", line));
                        if step_done {
                            bar.inc(1);
                        }
                    }
                    None => println!("{}", line),
                }
            })
            .await;
    }

    let stats = engine.run(&loaded).await;

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("\n{}", format_summary(&loaded.pipeline.name, &stats));
    }

    if stats.is_failed() {
        if let Some(reason) = &stats.error {
            error!("{}", reason);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let registry = ActionRegistry::builtin();
    match LoadedPipeline::load(&cmd.file, cmd.inputs.as_deref(), &registry) {
        Ok(loaded) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("{}", format_pipeline_overview(&loaded));

            if cmd.json {
                let json = serde_json::json!({
                    "pipeline": loaded.pipeline,
                    "inputs": loaded.inputs,
                });
                println!("\n{}", serde_json::to_string_pretty(&json)?);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

fn list_jobs(cmd: &JobsCommand) -> Result<()> {
    let registry = ActionRegistry::builtin();

    if cmd.json {
        let data = serde_json::json!({ "jobs": registry.job_names() });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Available jobs ({}):", INFO, registry.len());
    for job in registry.job_names() {
        println!("  {}", style(job).bold());
    }
    Ok(())
}
