use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fase global del job. Sólo avanza: Map -> Reduce -> Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPhase {
    Map,
    Reduce,
    Done,
}

/// Conteo de tareas por estado dentro de una fase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub idle: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn total(&self) -> usize {
        self.idle + self.in_progress + self.completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub phase: JobPhase,
    pub n_map: usize,
    pub n_reduce: usize,

    /// -------- Progreso --------
    pub map_tasks: TaskCounts,
    pub reduce_tasks: TaskCounts,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
