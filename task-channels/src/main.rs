use std::collections::BTreeMap;
use std::sync::Arc;

use bench_pool_core::ConsoleProgress;
use bench_pool_engines::{sample_registry, sample_work_list};
use bench_pool_task_channels::spawn_local_pool;
use serde::Deserialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Deserialize)]
struct Config {
    num_workers: usize,
    num_items: usize,
    latency_ms_min: u64,
    latency_ms_max: u64,
}

impl Config {
    fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::load("config.json") {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(%error, "config.json not usable, using defaults");
            Config {
                num_workers: 10,
                num_items: 20,
                latency_ms_min: 0,
                latency_ms_max: 5000,
            }
        }
    };
    tracing::info!(?config, "starting in-process pool");

    let registry = Arc::new(sample_registry(
        config.latency_ms_min..config.latency_ms_max,
    )?);
    tracing::info!(
        engines = ?registry.engine_ids().collect::<Vec<_>>(),
        "registry ready"
    );
    let work_items = sample_work_list(&mut rand::rng(), config.num_items);

    let pool = spawn_local_pool(config.num_workers, registry);
    let mut progress = ConsoleProgress::new("Running benchmarks");
    let results = pool.run(work_items, &mut progress).await?;

    let mut per_engine: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for result in &results {
        let entry = per_engine.entry(result.item.engine_id.as_str()).or_default();
        if result.is_success() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    for result in &results {
        match result.error() {
            None => println!(
                "{:>6} {:>10} ok",
                result.item.benchmark_id, result.item.engine_id
            ),
            Some(error) => println!(
                "{:>6} {:>10} failed: {error}",
                result.item.benchmark_id, result.item.engine_id
            ),
        }
    }
    for (engine, (ok, failed)) in &per_engine {
        println!("{engine}: {ok} succeeded, {failed} failed");
    }

    Ok(())
}
