use anyhow::Result;
use clap::Parser;
use mr_master::{expand_inputs, monitor, serve_until_done, AppState, JobState};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mr-master")]
#[command(about = "Master map/reduce: reparte tareas y detecta workers caídos")]
struct Cli {
    /// Dirección donde escuchan los workers
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Cantidad de tareas de reduce
    #[arg(short = 'r', long, default_value_t = 10)]
    n_reduce: usize,

    /// Archivos de entrada (acepta patrones glob), uno por tarea de map
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mr_master=debug,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let inputs = expand_inputs(&cli.inputs)?;
    info!("{} archivos de entrada, {} reduces", inputs.len(), cli.n_reduce);

    let state = AppState::new(JobState::new(inputs, cli.n_reduce)?);
    let listener = TcpListener::bind(&cli.listen).await?;

    tokio::select! {
        res = serve_until_done(
            listener,
            state,
            monitor::DONE_POLL_INTERVAL,
            monitor::SHUTDOWN_GRACE,
        ) => res?,
        _ = signal::ctrl_c() => warn!("interrumpido antes de terminar el job"),
    }

    Ok(())
}
