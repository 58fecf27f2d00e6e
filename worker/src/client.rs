use anyhow::Result;
use common::{
    Task, TaskAssignmentRequest, TaskAssignmentResponse, TaskCompleteRequest, WorkerId,
};
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

const RPC_TIMEOUT: Duration = Duration::from_secs(5);

/// Cliente HTTP del canal de control. Un fallo de red nunca es fatal: se
/// devuelve `None`/`false` y el loop del worker decide.
#[derive(Clone)]
pub struct CoordinatorClient {
    http: Client,
    base_url: String,
    worker_id: WorkerId,
}

impl CoordinatorClient {
    pub fn new(base_url: impl Into<String>, worker_id: WorkerId) -> Result<Self> {
        // El canal de control es interno al cluster: nunca pasa por proxy.
        let http = Client::builder().timeout(RPC_TIMEOUT).no_proxy().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            worker_id,
        })
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Pide una tarea. `None` si el master no respondió.
    pub async fn request_task(&self) -> Option<Task> {
        match self.try_request_task().await {
            Ok(task) => Some(task),
            Err(e) => {
                warn!("no se pudo pedir tarea al master: {:#}", e);
                None
            }
        }
    }

    async fn try_request_task(&self) -> Result<Task> {
        let url = format!("{}/api/v1/tasks/next", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&TaskAssignmentRequest {
                worker_id: self.worker_id.clone(),
            })
            .send()
            .await?
            .error_for_status()?;

        let assignment: TaskAssignmentResponse = resp.json().await?;
        Ok(assignment.task)
    }

    /// Reporta una tarea terminada. `false` si el master no lo recibió.
    pub async fn report_completion(&self, task: &Task) -> bool {
        let url = format!("{}/api/v1/tasks/complete", self.base_url);
        let res = self
            .http
            .post(&url)
            .json(&TaskCompleteRequest {
                worker_id: self.worker_id.clone(),
                task: task.clone(),
            })
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match res {
            Ok(_) => true,
            Err(e) => {
                warn!("no se pudo reportar {:?} #{:?}: {}", task.kind(), task.index(), e);
                false
            }
        }
    }
}
