use serde::{Deserialize, Serialize};

pub mod apps;
pub mod engine;
pub mod intermediate;
pub mod job;
pub mod task;
pub mod worker;

pub use job::{JobInfo, JobPhase, TaskCounts};
pub use task::{MapTask, ReduceTask, Task, TaskIndex, TaskKind};
pub use worker::{
    TaskAssignmentRequest, TaskAssignmentResponse, TaskCompleteRequest, TaskCompleteResponse,
    WorkerId,
};

/// Par clave/valor emitido por un map. También es el registro que se
/// serializa en los archivos intermedios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
