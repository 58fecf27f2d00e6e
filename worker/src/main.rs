use anyhow::Result;
use clap::Parser;
use common::apps;
use mr_worker::{CoordinatorClient, Worker};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "mr-worker")]
#[command(about = "Worker map/reduce: pide tareas al master hasta que el job termina")]
struct Cli {
    /// Aplicación a ejecutar (wc, grep)
    #[arg(value_name = "APP")]
    app: String,

    /// URL base del master
    #[arg(long, env = "MASTER_URL", default_value = "http://localhost:8080")]
    master_url: String,

    /// Directorio compartido de archivos intermedios y de salida
    #[arg(long, env = "MR_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mr_worker=debug,reqwest=info")),
        )
        .init();

    let cli = Cli::parse();
    let app = apps::named(&cli.app)?;

    // Nombre de host (solo para logs del master)
    let hostname = hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let worker_id = format!("{}-{}", hostname, Uuid::new_v4());

    let client = CoordinatorClient::new(cli.master_url, worker_id)?;
    Worker::new(client, app, cli.work_dir).run().await
}
