use clap::Parser;
use helpcenter_sync::api::{HelpCenterApi, HttpHelpCenterClient};
use helpcenter_sync::cli::Args;
use helpcenter_sync::config::{ApiConfig, SyncConfig};
use helpcenter_sync::content::ReadContext;
use helpcenter_sync::error::{SyncError, SyncResult};
use helpcenter_sync::meta::{AlwaysChanged, ChangeDetector, ContentHash, MetadataSchemas};
use helpcenter_sync::orchestrator::{Orchestrator, ReportCounts, SyncReport};
use helpcenter_sync::render::CommonMarkRenderer;
use helpcenter_sync::storage::{ContentStorage, FsStorage};
use helpcenter_sync::uploader::SyncContext;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct JsonReport<'a> {
    counts: ReportCounts,
    #[serde(flatten)]
    report: &'a SyncReport,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "helpcenter_sync=debug"
    } else {
        "helpcenter_sync=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args).await {
        Ok(report) if report.has_failures() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> SyncResult<SyncReport> {
    let mut config = SyncConfig::load_or_default(args.config.as_deref())?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
        config.validate()?;
    }

    let schemas = MetadataSchemas::new()
        .map_err(|e| SyncError::config(format!("invalid metadata schema: {}", e)))?;
    let storage: Arc<dyn ContentStorage> = Arc::new(FsStorage::from_config(&config));
    let read_ctx = ReadContext::new(storage.clone(), Arc::new(schemas), &config);

    let (mut categories, mut report) = Orchestrator::load_root(&read_ctx, &args.root).await?;
    if args.validate_only || (report.has_failures() && categories.is_empty()) {
        print_report(&report, args.json)?;
        return Ok(report);
    }

    let api_config = ApiConfig::from_parts(args.url, args.user, args.token)?;
    let api: Arc<dyn HelpCenterApi> = Arc::new(HttpHelpCenterClient::new(&api_config)?);
    let detector: Arc<dyn ChangeDetector> = if args.force {
        Arc::new(AlwaysChanged)
    } else {
        Arc::new(ContentHash)
    };
    let ctx = SyncContext {
        api,
        storage,
        renderer: Arc::new(CommonMarkRenderer),
        detector,
    };

    let orchestrator = Orchestrator::new(ctx, config.concurrency);
    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        let _ = signal::ctrl_c().await;
        tracing::info!("Received Ctrl+C, finishing in-flight operations");
        token.cancel();
    });

    // Keep only load failures; successfully read nodes are reported by the run.
    report.nodes.retain(|n| n.outcome.is_failure());
    report.merge(orchestrator.run(&mut categories).await);
    let report = report.finish();

    print_report(&report, args.json)?;
    Ok(report)
}

fn print_report(report: &SyncReport, json: bool) -> SyncResult<()> {
    let counts = report.counts();
    if json {
        let out = JsonReport { counts, report };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    for node in &report.nodes {
        println!("{}", node);
    }
    println!(
        "{} created, {} updated, {} unchanged, {} valid, {} failed, {} skipped",
        counts.created,
        counts.updated,
        counts.unchanged,
        counts.valid,
        counts.failed,
        counts.skipped
    );
    Ok(())
}
