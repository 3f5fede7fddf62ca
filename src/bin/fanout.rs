//! fanout CLI: run the fan-out benchmark or prepare its schema.

use clap::{Args, Parser, Subcommand};
use fanout_bench::config::Config;
use fanout_bench::config::secrets::{ExposeSecret, redact_url};
use fanout_bench::engine::{CompletionPolicy, Harness, HarnessConfig, RunSummary};
use fanout_bench::model::RunParams;
use fanout_bench::storage::{
    Backend, CqlOptions, CqlTimelineStore, MemoryTimelineStore, PgTimelineStore, TimelineStore,
};
use fanout_bench::telemetry::{TelemetryConfig, init_telemetry};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fanout", about = "Fan-out write throughput harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fan messages out to follower timelines and time it
    Run(RunArgs),
    /// Create the keyspace and timeline table (CQL backend)
    Schema(SchemaArgs),
}

/// Where to write. Each flag overrides its environment variable.
#[derive(Args)]
struct TargetArgs {
    /// Storage backend: cql, postgres or memory
    #[arg(long)]
    backend: Option<Backend>,
    /// Comma-separated cluster contact points
    #[arg(long, value_delimiter = ',')]
    contact_points: Option<Vec<String>>,
    /// CQL keyspace holding the timeline table
    #[arg(long)]
    keyspace: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Number of concurrent writers
    #[arg(long)]
    threads: Option<usize>,
    /// Number of messages to fan out
    #[arg(long)]
    messages: Option<u64>,
    /// Number of followers per message
    #[arg(long)]
    followers: Option<usize>,
    /// When the run counts as finished: acknowledged or queue-drained
    #[arg(long)]
    completion: Option<CompletionPolicy>,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SchemaArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// Replication factor for a newly created keyspace
    #[arg(long)]
    replication_factor: Option<u32>,
}

impl TargetArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(ref points) = self.contact_points {
            config.contact_points = points
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }
        if let Some(ref keyspace) = self.keyspace {
            config.keyspace = keyspace.clone();
        }
    }
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        self.target.apply(config);
        if let Some(threads) = self.threads {
            config.worker_count = threads;
        }
        if let Some(messages) = self.messages {
            config.message_count = messages;
        }
        if let Some(followers) = self.followers {
            config.follower_count = followers;
        }
        if let Some(completion) = self.completion {
            config.completion = completion;
        }
    }
}

impl SchemaArgs {
    fn apply(&self, config: &mut Config) {
        self.target.apply(config);
        if let Some(rf) = self.replication_factor {
            config.replication_factor = rf;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    match &cli.command {
        Command::Run(args) => args.apply(&mut config),
        Command::Schema(args) => args.apply(&mut config),
    }
    config.validate()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "fanout-bench".to_string(),
        log_level: config.log_level.clone(),
    })?;

    match cli.command {
        Command::Run(args) => cmd_run(config, args.json).await,
        Command::Schema(_) => cmd_schema(config).await,
    }
}

async fn cmd_run(config: Config, json: bool) -> anyhow::Result<()> {
    let params = config.run_params();
    let harness_config = HarnessConfig {
        completion: config.completion,
        poll_interval: config.poll_interval,
        settle_delay: config.settle_delay,
    };

    info!(
        backend = %config.backend,
        workers = params.worker_count,
        messages = params.message_count,
        followers = params.follower_count,
        completion = %config.completion,
        "starting fan-out run"
    );

    let summary = match config.backend {
        Backend::Cql => {
            let store = CqlTimelineStore::connect(&CqlOptions::from_config(&config)).await?;
            execute(store, params, harness_config).await
        }
        Backend::Postgres => {
            let url = config
                .database_url
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for postgres"))?;
            info!(url = %redact_url(url), "connecting to postgres");
            let store = PgTimelineStore::connect(url.expose_secret(), config.pool_size()).await?;
            execute(store, params, harness_config).await
        }
        Backend::Memory => execute(MemoryTimelineStore::new(), params, harness_config).await,
    };

    println!("Shared session test finished.");
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
        println!(
            "Writes:     {} acknowledged, {} failed of {} enqueued ({:.0}/s)",
            summary.acknowledged, summary.failed, summary.enqueued, summary.writes_per_sec
        );
    }

    if !summary.completed {
        anyhow::bail!("run cancelled before completion");
    }
    Ok(())
}

async fn execute<S: TimelineStore>(
    store: S,
    params: RunParams,
    harness_config: HarnessConfig,
) -> RunSummary {
    let harness = Harness::new(store, params, harness_config);

    let token = harness.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping workers");
            token.cancel();
        }
    });

    harness.run().await
}

async fn cmd_schema(config: Config) -> anyhow::Result<()> {
    match config.backend {
        Backend::Cql => {
            CqlTimelineStore::create_schema(&CqlOptions::from_config(&config)).await?;
            println!("Schema ready in keyspace {}.", config.keyspace);
        }
        Backend::Postgres => {
            // Connecting runs the embedded migrations.
            let url = config
                .database_url
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for postgres"))?;
            let store = PgTimelineStore::connect(url.expose_secret(), 1).await?;
            store.health_check().await?;
            store.close().await?;
            println!("Schema ready in {}.", redact_url(url));
        }
        Backend::Memory => println!("The memory backend has no schema."),
    }
    Ok(())
}
