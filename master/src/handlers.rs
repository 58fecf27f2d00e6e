use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use common::{
    JobInfo, Task, TaskAssignmentRequest, TaskAssignmentResponse, TaskCompleteRequest,
    TaskCompleteResponse,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/job", get(get_job))
        .route("/api/v1/tasks/next", post(assign_task))
        .route("/api/v1/tasks/complete", post(complete_task))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Progreso del job
async fn get_job(State(state): State<AppState>) -> Json<JobInfo> {
    Json(state.info())
}

// Entrega la próxima tarea (o un centinela Wait/Exit)
async fn assign_task(
    State(state): State<AppState>,
    Json(req): Json<TaskAssignmentRequest>,
) -> Json<TaskAssignmentResponse> {
    let task = state.request_task();

    match &task {
        Task::Map(m) => info!(
            "asignando map #{} ({}) al worker {}",
            m.index, m.input_path, req.worker_id
        ),
        Task::Reduce(r) => info!("asignando reduce #{} al worker {}", r.index, req.worker_id),
        Task::Wait => debug!("worker {} pidió tarea pero no hay, que espere", req.worker_id),
        Task::Exit => debug!("job terminado, worker {} debe salir", req.worker_id),
    }

    Json(TaskAssignmentResponse { task })
}

// Worker reporta que terminó una tarea. Duplicados y reportes tardíos se
// aceptan sin error.
async fn complete_task(
    State(state): State<AppState>,
    Json(req): Json<TaskCompleteRequest>,
) -> Result<Json<TaskCompleteResponse>, StatusCode> {
    if req.task.is_sentinel() {
        warn!(
            "worker {} reportó un centinela {:?}",
            req.worker_id,
            req.task.kind()
        );
        return Err(StatusCode::BAD_REQUEST);
    }

    if state.report_completion(&req.task) {
        info!(
            "worker {} completó {:?} #{:?}",
            req.worker_id,
            req.task.kind(),
            req.task.index()
        );
    } else {
        debug!(
            "reporte ignorado de worker {}: {:?} #{:?}",
            req.worker_id,
            req.task.kind(),
            req.task.index()
        );
    }

    Ok(Json(TaskCompleteResponse { ok: true }))
}
