use serde::{Deserialize, Serialize};

/// Posición de una tarea dentro de su fase (0-based, estable durante todo el job).
pub type TaskIndex = usize;

/// Tipo de respuesta que recibe un worker al pedir trabajo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Map,
    Reduce,
    /// No hay trabajo listo todavía: dormir y reintentar.
    Wait,
    /// El job terminó: el worker debe salir.
    Exit,
}

/// Tarea de map: un archivo de entrada completo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTask {
    pub index: TaskIndex,
    /// Ruta del archivo de entrada
    pub input_path: String,
    /// Cantidad de particiones de salida (una por tarea de reduce)
    pub n_reduce: usize,
}

/// Tarea de reduce: una partición, leída desde la salida de todos los maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceTask {
    pub index: TaskIndex,
    /// Cantidad de tareas de map, para saber cuántos shards leer
    pub n_map: usize,
    pub n_reduce: usize,
}

/// Descriptor inmutable que viaja por el canal de control.
///
/// `Wait` y `Exit` son centinelas: no llevan trabajo, sólo controlan el loop
/// del worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    Map(MapTask),
    Reduce(ReduceTask),
    Wait,
    Exit,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Map(_) => TaskKind::Map,
            Task::Reduce(_) => TaskKind::Reduce,
            Task::Wait => TaskKind::Wait,
            Task::Exit => TaskKind::Exit,
        }
    }

    /// Índice de la tarea, `None` para los centinelas.
    pub fn index(&self) -> Option<TaskIndex> {
        match self {
            Task::Map(m) => Some(m.index),
            Task::Reduce(r) => Some(r.index),
            Task::Wait | Task::Exit => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Task::Wait | Task::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_map_se_serializa_con_tag_kind() {
        let task = Task::Map(MapTask {
            index: 2,
            input_path: "pg-1.txt".to_string(),
            n_reduce: 3,
        });

        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(
            v,
            json!({"kind": "map", "index": 2, "input_path": "pg-1.txt", "n_reduce": 3})
        );
    }

    #[test]
    fn centinelas_se_leen_desde_json() {
        let wait: Task = serde_json::from_value(json!({"kind": "wait"})).unwrap();
        let exit: Task = serde_json::from_value(json!({"kind": "exit"})).unwrap();

        assert_eq!(wait.kind(), TaskKind::Wait);
        assert_eq!(exit.kind(), TaskKind::Exit);
        assert!(wait.is_sentinel() && exit.is_sentinel());
        assert_eq!(exit.index(), None);
    }

    #[test]
    fn reduce_expone_su_indice() {
        let task = Task::Reduce(ReduceTask {
            index: 1,
            n_map: 4,
            n_reduce: 2,
        });
        assert_eq!(task.kind(), TaskKind::Reduce);
        assert_eq!(task.index(), Some(1));
        assert!(!task.is_sentinel());
    }
}
