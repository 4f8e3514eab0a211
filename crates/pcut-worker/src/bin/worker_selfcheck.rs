//! Deployment self-check: verifies the worker host has everything a job run
//! needs before any job is accepted.

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pcut_models::EditPlan;
use pcut_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::from_env();
    println!(
        "worker-selfcheck: starting with work_dir={}",
        config.work_dir
    );

    ensure_workdir(&config.work_dir).await?;
    ensure_ffmpeg()?;
    ensure_env_present(&[
        "SPACES_ENDPOINT_URL",
        "SPACES_ACCESS_KEY_ID",
        "SPACES_SECRET_ACCESS_KEY",
        "SPACES_BUCKET_NAME",
    ])?;
    smoke_test_plan_compiler()?;

    println!("worker-selfcheck: ok");
    Ok(())
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pcut=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path.as_ref()).await?;
    Ok(())
}

fn ensure_ffmpeg() -> anyhow::Result<()> {
    let path = pcut_media::check_ffmpeg().map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("worker-selfcheck: ffmpeg at {}", path.display());
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}

fn smoke_test_plan_compiler() -> anyhow::Result<()> {
    let plan = EditPlan::parse("Keep: 0-1. Quality: medium.");
    let segments = plan.validate().map_err(|e| anyhow::anyhow!("{e}"))?;
    let graph = pcut_media::FilterGraph::compile(&segments);
    if !graph.filter_complex().contains("concat") {
        return Err(anyhow::anyhow!("filter graph compilation produced no concat"));
    }
    Ok(())
}
