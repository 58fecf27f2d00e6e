// master/src/state.rs

use common::{JobInfo, Task};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use crate::scheduler::JobState;

/// Estado de una tarea del lado del master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Idle,
    /// `assigned_at` es la última (re)asignación.
    InProgress { assigned_at: Instant },
    Completed,
}

/// Descriptor inmutable + estado mutable de una tarea.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub task: Task,
    pub status: TaskStatus,
}

impl TaskRecord {
    pub fn idle(task: Task) -> Self {
        Self {
            task,
            status: TaskStatus::Idle,
        }
    }

    pub fn assign(&mut self, now: Instant) -> Task {
        self.status = TaskStatus::InProgress { assigned_at: now };
        self.task.clone()
    }
}

/// Estado compartido por todos los handlers HTTP.
///
/// Un único mutex protege todo el `JobState`; se toma sólo durante la
/// decisión de scheduling, nunca a través de I/O.
#[derive(Clone)]
pub struct AppState {
    job: Arc<Mutex<JobState>>,
}

impl AppState {
    pub fn new(job: JobState) -> Self {
        Self {
            job: Arc::new(Mutex::new(job)),
        }
    }

    // Cada sección crítica deja el registro consistente, así que un lock
    // envenenado se puede seguir usando.
    fn lock(&self) -> MutexGuard<'_, JobState> {
        self.job.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request_task(&self) -> Task {
        self.lock().request_task(Instant::now())
    }

    /// `true` si el reporte cambió el estado de la tarea.
    pub fn report_completion(&self, task: &Task) -> bool {
        self.lock().report_completion(task)
    }

    pub fn done(&self) -> bool {
        self.lock().done()
    }

    pub fn info(&self) -> JobInfo {
        self.lock().info()
    }
}
