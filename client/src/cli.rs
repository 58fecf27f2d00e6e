use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use common::{apps, engine, JobInfo, TaskCounts};
use reqwest::Client;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mr-client")]
#[command(about = "CLI simple para hablar con el master")]
struct Cli {
    /// URL base del master
    #[arg(long, env = "MASTER_URL", default_value = "http://localhost:8080")]
    master_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consulta el progreso del job
    Status,

    /// Ejecuta el job completo en este proceso (salida de referencia)
    Sequential {
        /// Aplicación (wc, grep)
        #[arg(value_name = "APP")]
        app: String,

        /// Archivos de entrada
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<String>,

        /// Archivo de salida
        #[arg(long, default_value = "mr-out-0")]
        output: PathBuf,
    },
}

/// "completadas/total (en curso: n)"
fn format_counts(c: &TaskCounts) -> String {
    format!("{}/{} (en curso: {})", c.completed, c.total(), c.in_progress)
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let url = format!("{}/api/v1/job", cli.master_url.trim_end_matches('/'));
            let resp = Client::new().get(&url).send().await?;
            if !resp.status().is_success() {
                bail!("el master respondió {} en {}", resp.status(), url);
            }

            let job: JobInfo = resp.json().await?;
            println!("Job:");
            println!("  fase     : {:?}", job.phase);
            println!("  maps     : {}", format_counts(&job.map_tasks));
            println!("  reduces  : {}", format_counts(&job.reduce_tasks));
            println!("  iniciado : {}", job.started_at);
            if let Some(ref done) = job.finished_at {
                println!("  terminado: {}", done);
            }
        }

        Commands::Sequential {
            app,
            inputs,
            output,
        } => {
            let app = apps::named(&app)?;
            let keys = engine::run_sequential(app.as_ref(), &inputs, &output)?;
            println!(
                "{} archivos procesados, {} claves en {}",
                inputs.len(),
                keys,
                output.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_counts_muestra_progreso() {
        let c = TaskCounts {
            idle: 1,
            in_progress: 2,
            completed: 3,
        };
        assert_eq!(format_counts(&c), "3/6 (en curso: 2)");
    }

    #[test]
    fn cli_parsea_sequential() {
        let cli = Cli::try_parse_from(["mr-client", "sequential", "wc", "a.txt", "b.txt"]).unwrap();
        match cli.command {
            Commands::Sequential {
                app,
                inputs,
                output,
            } => {
                assert_eq!(app, "wc");
                assert_eq!(inputs, vec!["a.txt", "b.txt"]);
                assert_eq!(output, PathBuf::from("mr-out-0"));
            }
            Commands::Status => panic!("esperaba sequential"),
        }
    }
}
