//! CLI command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use greenlight_config::AppConfig;
use greenlight_core::caller::AgentCaller;
use greenlight_core::event::DomainEvent;
use greenlight_core::profile::AgentProfile;
use greenlight_core::scene::{Scene, VecFeed};
use greenlight_engine::pipeline::{PipelineConfig, ReviewPipeline};
use greenlight_engine::scripted::{DryRunCaller, Script, ScriptedCaller};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Run a review session over a parsed scene file.
pub async fn review(
    scenes_path: PathBuf,
    config_path: Option<PathBuf>,
    script_path: Option<PathBuf>,
    out_path: Option<PathBuf>,
) -> CommandResult {
    let config = match &config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };

    let scenes = load_scenes(&scenes_path)?;
    info!(scenes = scenes.len(), "Loaded scene file");
    let feed = VecFeed::new(scenes)?;

    let caller: Arc<dyn AgentCaller> = match &script_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let script: Script = serde_json::from_str(&raw)?;
            Arc::new(ScriptedCaller::new(script))
        }
        None => Arc::new(DryRunCaller),
    };
    info!(caller = caller.name(), "Caller selected");

    let title = config
        .title
        .clone()
        .or_else(|| {
            scenes_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "Untitled".into());

    let mut pipeline =
        ReviewPipeline::new(pipeline_config(&config, title), config.roster(), caller)?;

    // Stream progress while the run is in flight.
    let mut events = pipeline.events().subscribe();
    let progress = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event.as_ref() {
                DomainEvent::SceneProcessed {
                    scene,
                    agents_completed,
                    agents_skipped,
                    ..
                } => {
                    println!(
                        "scene {scene}: {agents_completed} agents done{}",
                        if *agents_skipped > 0 {
                            format!(", {agents_skipped} skipped")
                        } else {
                            String::new()
                        }
                    );
                }
                DomainEvent::DigestCreated { scene, importance, .. } => {
                    println!("  digested scene {scene} (importance {importance:.2})");
                }
                DomainEvent::QuestionRaised { id, agent_id, .. } => {
                    println!("  {agent_id} raised {id}");
                }
                _ => {}
            }
        }
    });

    let report = pipeline.run(feed).await?;
    progress.abort();

    println!("\n{}", report.render());

    if let Some(path) = out_path {
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        println!("report written to {}", path.display());
    }
    Ok(())
}

/// List the built-in reviewer profiles.
pub fn profiles() -> CommandResult {
    for profile in AgentProfile::builtin_roster() {
        println!("{:<18} {} — {}", profile.id, profile.name, profile.description);
    }
    Ok(())
}

fn load_scenes(path: &Path) -> Result<Vec<Scene>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn pipeline_config(config: &AppConfig, title: String) -> PipelineConfig {
    PipelineConfig {
        title,
        buffer_capacity: config.review.buffer_capacity,
        min_question_importance: config.context.min_question_importance,
        digest_cap: config.context.digest_cap,
        journey_window: config.context.journey_window,
        call_timeout: Duration::from_secs(config.caller.timeout_secs),
        max_attempts: config.caller.max_attempts,
        retry_base_delay: Duration::from_millis(config.caller.retry_base_delay_ms),
        prune_threshold: config.review.prune_threshold,
    }
}
