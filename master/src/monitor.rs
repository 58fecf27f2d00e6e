use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::state::AppState;

/// Cada cuánto se consulta `done()`.
pub const DONE_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Margen para que los workers que siguen pidiendo vean `Exit` antes de
/// apagar el servidor. Cubre varios ciclos de espera del worker (1 s): uno
/// que recibió `Wait` justo antes del final alcanza a volver a pedir.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Vuelve cuando el job terminó y pasó el margen de gracia.
pub async fn wait_until_done(state: AppState, poll: Duration, grace: Duration) {
    loop {
        if state.done() {
            break;
        }
        sleep(poll).await;
    }

    let info = state.info();
    info!(
        "job terminado: {} maps, {} reduces, apagando en {:?}",
        info.n_map, info.n_reduce, grace
    );
    sleep(grace).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::JobState;

    #[tokio::test]
    async fn wait_until_done_vuelve_cuando_el_job_termina() {
        let state = AppState::new(JobState::new(vec!["a.txt".to_string()], 1).unwrap());

        let waiter = tokio::spawn(wait_until_done(
            state.clone(),
            Duration::from_millis(10),
            Duration::from_millis(10),
        ));

        // Completa el job "a mano".
        for _ in 0..2 {
            let task = state.request_task();
            assert!(state.report_completion(&task));
        }

        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("el monitor no terminó")
            .unwrap();
        assert!(state.done());
    }
}
