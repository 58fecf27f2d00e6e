use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use common::{JobInfo, JobPhase, MapTask, ReduceTask, Task, TaskCounts};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::state::{TaskRecord, TaskStatus};

/// Edad máxima de una asignación sin reporte antes de re-entregar la tarea.
pub const TASK_TIMEOUT: Duration = Duration::from_secs(10);

/// Registro de tareas + máquina de estados del job.
///
/// Fases: Map -> Reduce -> Done, sin vuelta atrás. Ninguna tarea de reduce se
/// entrega mientras quede un map sin completar.
#[derive(Debug)]
pub struct JobState {
    map_tasks: Vec<TaskRecord>,
    reduce_tasks: Vec<TaskRecord>,
    phase: JobPhase,
    task_timeout: Duration,

    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

/// Resultado de recorrer las tareas de una fase.
enum Scan {
    Assign(Task),
    Pending,
    AllCompleted,
}

impl JobState {
    pub fn new(inputs: Vec<String>, n_reduce: usize) -> Result<Self> {
        Self::with_timeout(inputs, n_reduce, TASK_TIMEOUT)
    }

    pub fn with_timeout(inputs: Vec<String>, n_reduce: usize, task_timeout: Duration) -> Result<Self> {
        ensure!(n_reduce > 0, "n_reduce debe ser mayor que 0");

        let n_map = inputs.len();
        let map_tasks = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input_path)| {
                TaskRecord::idle(Task::Map(MapTask {
                    index,
                    input_path,
                    n_reduce,
                }))
            })
            .collect();

        let reduce_tasks = (0..n_reduce)
            .map(|index| {
                TaskRecord::idle(Task::Reduce(ReduceTask {
                    index,
                    n_map,
                    n_reduce,
                }))
            })
            .collect();

        Ok(Self {
            map_tasks,
            reduce_tasks,
            phase: JobPhase::Map,
            task_timeout,
            started_at: Utc::now(),
            finished_at: None,
        })
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn done(&self) -> bool {
        self.phase == JobPhase::Done
    }

    /// Elige la próxima tarea para un worker.
    ///
    /// Recorre la fase actual en orden de índice: la primera tarea Idle, o
    /// en curso hace más de `task_timeout`, se entrega (y se sella con `now`).
    /// Si todas las tareas de la fase están completas se pasa a la siguiente
    /// en la misma llamada.
    pub fn request_task(&mut self, now: Instant) -> Task {
        if self.phase == JobPhase::Map {
            match scan(&mut self.map_tasks, now, self.task_timeout) {
                Scan::Assign(task) => return task,
                Scan::Pending => return Task::Wait,
                Scan::AllCompleted => self.enter(JobPhase::Reduce),
            }
        }

        if self.phase == JobPhase::Reduce {
            match scan(&mut self.reduce_tasks, now, self.task_timeout) {
                Scan::Assign(task) => return task,
                Scan::Pending => return Task::Wait,
                Scan::AllCompleted => self.enter(JobPhase::Done),
            }
        }

        Task::Exit
    }

    /// Marca como completada la tarea del descriptor si estaba en curso.
    ///
    /// Reportes duplicados, tardíos, de una fase ya pasada o que no
    /// corresponden a ninguna tarea se ignoran (devuelve `false`).
    pub fn report_completion(&mut self, task: &Task) -> bool {
        let (phase, index) = match task {
            Task::Map(m) => (JobPhase::Map, m.index),
            Task::Reduce(r) => (JobPhase::Reduce, r.index),
            Task::Wait | Task::Exit => return false,
        };

        if self.phase != phase {
            debug!("ignorando reporte de {:?} #{} en fase {:?}", phase, index, self.phase);
            return false;
        }

        let records = match phase {
            JobPhase::Map => &mut self.map_tasks,
            _ => &mut self.reduce_tasks,
        };

        let Some(record) = records.get_mut(index) else {
            warn!("reporte de {:?} #{} fuera de rango", phase, index);
            return false;
        };

        if record.task != *task {
            warn!("reporte con descriptor distinto al emitido: {:?}", task);
            return false;
        }

        match record.status {
            TaskStatus::InProgress { .. } => record.status = TaskStatus::Completed,
            TaskStatus::Completed => {
                debug!("{:?} #{} ya estaba completada", phase, index);
                return false;
            }
            TaskStatus::Idle => {
                warn!("{:?} #{} reportada sin haber sido asignada", phase, index);
                return false;
            }
        }

        self.advance();
        true
    }

    pub fn info(&self) -> JobInfo {
        JobInfo {
            phase: self.phase,
            n_map: self.map_tasks.len(),
            n_reduce: self.reduce_tasks.len(),
            map_tasks: counts(&self.map_tasks),
            reduce_tasks: counts(&self.reduce_tasks),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    // Avanza de fase apenas llega el último reporte, así `done()` no espera
    // al próximo pedido de un worker.
    fn advance(&mut self) {
        if self.phase == JobPhase::Map && all_completed(&self.map_tasks) {
            self.enter(JobPhase::Reduce);
        }
        if self.phase == JobPhase::Reduce && all_completed(&self.reduce_tasks) {
            self.enter(JobPhase::Done);
        }
    }

    fn enter(&mut self, phase: JobPhase) {
        info!("fase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        if phase == JobPhase::Done {
            self.finished_at = Some(Utc::now());
        }
    }
}

fn scan(records: &mut [TaskRecord], now: Instant, timeout: Duration) -> Scan {
    let mut completed = 0;

    for record in records.iter_mut() {
        match record.status {
            TaskStatus::Idle => return Scan::Assign(record.assign(now)),
            TaskStatus::InProgress { assigned_at } => {
                let age = now.saturating_duration_since(assigned_at);
                if age > timeout {
                    // El worker anterior no se entera: si sigue vivo, los dos
                    // escriben los mismos archivos y gana el último.
                    warn!(
                        "reasignando {:?} #{:?} (sin reporte hace {:?})",
                        record.task.kind(),
                        record.task.index(),
                        age
                    );
                    return Scan::Assign(record.assign(now));
                }
            }
            TaskStatus::Completed => completed += 1,
        }
    }

    if completed < records.len() {
        Scan::Pending
    } else {
        Scan::AllCompleted
    }
}

fn all_completed(records: &[TaskRecord]) -> bool {
    records.iter().all(|r| r.status == TaskStatus::Completed)
}

fn counts(records: &[TaskRecord]) -> TaskCounts {
    let mut c = TaskCounts::default();
    for r in records {
        match r.status {
            TaskStatus::Idle => c.idle += 1,
            TaskStatus::InProgress { .. } => c.in_progress += 1,
            TaskStatus::Completed => c.completed += 1,
        }
    }
    c
}
