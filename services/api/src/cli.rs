use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use internal_mobility::config::AppConfig;
use internal_mobility::error::AppError;
use internal_mobility::telemetry;
use internal_mobility::workflows::requisition::{
    PostgresStore, RequisitionId, RequisitionScanService,
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "Internal Mobility Orchestrator",
    about = "Scan hiring requisitions against the internal workforce",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Scan one requisition stored in PostgreSQL and print the outcome
    Scan(ScanArgs),
    /// Walk the scan scenarios against an in-memory workforce
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ScanArgs {
    /// Identifier of the requisition to scan
    #[arg(long)]
    pub(crate) requisition_id: i64,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scan(args) => run_scan(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

async fn run_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(PostgresStore::connect(config.require_database()?).await?);
    let service = RequisitionScanService::new(store.clone(), store.clone(), store);

    let result = service.scan(RequisitionId(args.requisition_id)).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
