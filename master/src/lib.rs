//! Master del sistema map/reduce: registro de tareas, scheduler y el canal de
//! control HTTP por el que los workers piden trabajo y reportan.

use anyhow::{bail, Result};
use glob::glob;
use std::{collections::HashSet, time::Duration};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub mod handlers;
pub mod monitor;
pub mod scheduler;
pub mod state;

pub use handlers::build_router;
pub use scheduler::{JobState, TASK_TIMEOUT};
pub use state::AppState;

/// Expande los patrones de entrada con glob, en orden y sin duplicados.
/// Un patrón que no matchea nada se usa tal cual: el map fallará en el worker
/// igual que con un archivo inexistente.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for pattern in patterns {
        let entries = match glob(pattern) {
            Ok(entries) => entries,
            Err(e) => bail!("patrón de entrada inválido `{}`: {}", pattern, e),
        };

        let mut matched = false;
        for path in entries.flatten() {
            if path.is_file() {
                matched = true;
                let p = path.to_string_lossy().to_string();
                if seen.insert(p.clone()) {
                    out.push(p);
                }
            }
        }

        if !matched {
            warn!("`{}` no matchea ningún archivo, se usa literal", pattern);
            if seen.insert(pattern.clone()) {
                out.push(pattern.clone());
            }
        }
    }

    Ok(out)
}

/// Sirve el canal de control hasta que el job termina.
pub async fn serve_until_done(
    listener: TcpListener,
    state: AppState,
    poll: Duration,
    grace: Duration,
) -> Result<()> {
    info!("master escuchando en {}", listener.local_addr()?);

    let app = build_router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(monitor::wait_until_done(state, poll, grace))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn expand_inputs_ordena_deduplica_y_conserva_literales() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "c.log"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        let dir = tmp.path().to_string_lossy().to_string();

        let patterns = vec![
            format!("{dir}/*.txt"),
            format!("{dir}/a.txt"),
            format!("{dir}/falta.txt"),
        ];
        let inputs = expand_inputs(&patterns).unwrap();

        assert_eq!(
            inputs,
            vec![
                format!("{dir}/a.txt"),
                format!("{dir}/b.txt"),
                format!("{dir}/falta.txt"),
            ]
        );
    }

    #[test]
    fn expand_inputs_rechaza_patrones_invalidos() {
        assert!(expand_inputs(&["[".to_string()]).is_err());
    }
}
