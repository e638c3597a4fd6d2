use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use bench_pool_core::ConsoleProgress;
use bench_pool_engines::{load_work_list, sample_registry, sample_work_list};
use bench_pool_process_rpc::{connect_pool, WorkerServer};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "bench-pool-process-rpc",
    about = "Benchmark pool spread across worker processes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dispatch a work list to remote workers and collect the results.
    Coordinator {
        /// Worker task addresses in rank order.
        #[arg(long, required = true, value_delimiter = ',')]
        workers: Vec<SocketAddr>,

        /// JSON work list file. Without it a sample list is generated.
        #[arg(long)]
        worklist: Option<String>,

        /// Size of the generated sample list.
        #[arg(long, default_value_t = 20)]
        sample_size: usize,

        /// Bind address for collecting results.
        #[arg(long, default_value = "127.0.0.1:0")]
        collect: String,

        /// Address workers dial back, for when the bind address is a
        /// wildcard interface.
        #[arg(long)]
        advertise: Option<IpAddr>,
    },
    /// Run one worker process until the coordinator shuts it down.
    Worker {
        /// Listen address for task messages.
        #[arg(long, default_value = "127.0.0.1:0")]
        listen: String,

        /// Host label for trace records. Defaults to $HOSTNAME.
        #[arg(long)]
        host: Option<String>,

        /// Lower bound on simulated engine latency, in milliseconds.
        #[arg(long, default_value_t = 0)]
        latency_min_ms: u64,

        /// Upper bound on simulated engine latency, in milliseconds.
        #[arg(long, default_value_t = 5000)]
        latency_max_ms: u64,
    },
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

    let cli = Cli::parse();
    match cli.command {
        Command::Coordinator {
            workers,
            worklist,
            sample_size,
            collect,
            advertise,
        } => {
            let work_items = match worklist {
                Some(path) => load_work_list(&path)?,
                None => sample_work_list(&mut rand::rng(), sample_size),
            };
            tracing::info!(
                items = work_items.len(),
                workers = workers.len(),
                "starting run"
            );

            let pool = connect_pool(&workers, &collect, advertise).await?;
            let mut progress = ConsoleProgress::new("Running benchmarks");
            let results = pool.run(work_items, &mut progress).await?;

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
            let mut per_engine: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
            for result in &results {
                let entry = per_engine.entry(result.item.engine_id.as_str()).or_default();
                if result.is_success() {
                    entry.0 += 1;
                } else {
                    entry.1 += 1;
                }
            }
            for (engine, (ok, failed)) in &per_engine {
                println!("{engine}: {ok} succeeded, {failed} failed");
            }

            let failed = results.iter().filter(|r| !r.is_success()).count();
            tracing::info!(completed = results.len(), failed, "run complete");
        }
        Command::Worker {
            listen,
            host,
            latency_min_ms,
            latency_max_ms,
        } => {
            let registry = Arc::new(sample_registry(latency_min_ms..latency_max_ms)?);
            tracing::info!(
                engines = ?registry.engine_ids().collect::<Vec<_>>(),
                "registry ready"
            );
            let server = WorkerServer::bind(&listen, host).await?;
            server.serve(registry).await?;
        }
    }

    Ok(())
}
