use anyhow::{Context, Result};
use common::{apps::MapReduceApp, engine, intermediate, MapTask, ReduceTask, Task};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::client::CoordinatorClient;

/// Pausa entre pedidos cuando no hay trabajo (o el master no responde).
pub const WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// Loop principal del worker: una tarea a la vez.
///
/// - `Map`/`Reduce`: ejecutar, escribir archivos, reportar.
/// - `Wait` o master caído: dormir `wait_interval` y volver a pedir.
/// - `Exit`: terminar.
///
/// Un error de I/O sobre el input o los archivos intermedios es fatal: `run`
/// devuelve error y el master re-entregará la tarea cuando venza.
pub struct Worker {
    client: CoordinatorClient,
    app: Arc<dyn MapReduceApp>,
    work_dir: PathBuf,
    wait_interval: Duration,
}

impl Worker {
    pub fn new(
        client: CoordinatorClient,
        app: Arc<dyn MapReduceApp>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            app,
            work_dir: work_dir.into(),
            wait_interval: WAIT_INTERVAL,
        }
    }

    pub fn with_wait_interval(mut self, wait_interval: Duration) -> Self {
        self.wait_interval = wait_interval;
        self
    }

    pub async fn run(&self) -> Result<()> {
        info!(
            "worker {} arrancando (work_dir={})",
            self.client.worker_id(),
            self.work_dir.display()
        );

        loop {
            let task = self.client.request_task().await.unwrap_or(Task::Wait);

            match &task {
                Task::Map(map) => self.run_map(map).await?,
                Task::Reduce(reduce) => self.run_reduce(reduce).await?,
                Task::Wait => {
                    debug!("sin tareas, esperando {:?}", self.wait_interval);
                    sleep(self.wait_interval).await;
                    continue;
                }
                Task::Exit => {
                    info!("job terminado, worker {} sale", self.client.worker_id());
                    return Ok(());
                }
            }

            self.client.report_completion(&task).await;
        }
    }

    async fn run_map(&self, task: &MapTask) -> Result<()> {
        info!("map #{} sobre {}", task.index, task.input_path);

        let app = Arc::clone(&self.app);
        let dir = self.work_dir.clone();
        let t = task.clone();
        let written = tokio::task::spawn_blocking(move || {
            let kvs = engine::map_file(app.as_ref(), &t.input_path)?;
            intermediate::write_partitions(&dir, t.index, t.n_reduce, kvs)
        })
        .await?
        .with_context(|| format!("map #{} sobre {}", task.index, task.input_path))?;

        info!("map #{} listo: {} particiones escritas", task.index, written.len());
        Ok(())
    }

    async fn run_reduce(&self, task: &ReduceTask) -> Result<()> {
        info!("reduce #{} sobre {} maps", task.index, task.n_map);

        let app = Arc::clone(&self.app);
        let dir = self.work_dir.clone();
        let t = task.clone();
        let (path, keys) = tokio::task::spawn_blocking(move || {
            let records = intermediate::read_reduce_input(&dir, t.index, t.n_map)?;
            let results = engine::reduce_records(app.as_ref(), records);
            let path = engine::write_output(&dir, t.index, &results)?;
            Ok::<_, std::io::Error>((path, results.len()))
        })
        .await?
        .with_context(|| format!("reduce #{}", task.index))?;

        info!("reduce #{} listo: {} claves en {}", task.index, keys, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::apps::wc::WordCount;
    use std::fs;

    fn worker(dir: &std::path::Path) -> Worker {
        // El master no se usa en estos tests.
        let client = CoordinatorClient::new("http://127.0.0.1:9", "test".to_string()).unwrap();
        Worker::new(client, Arc::new(WordCount), dir)
    }

    #[tokio::test]
    async fn map_y_reduce_producen_la_salida_de_la_particion() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("in.txt");
        fs::write(&input, "a b a").unwrap();
        let w = worker(tmp.path());

        w.run_map(&MapTask {
            index: 0,
            input_path: input.to_string_lossy().to_string(),
            n_reduce: 1,
        })
        .await
        .unwrap();
        assert!(tmp.path().join("mr-0-0").exists());

        w.run_reduce(&ReduceTask {
            index: 0,
            n_map: 1,
            n_reduce: 1,
        })
        .await
        .unwrap();

        let out = fs::read_to_string(tmp.path().join("mr-out-0")).unwrap();
        assert_eq!(out, "a 2\nb 1\n");
    }

    #[test]
    fn el_master_espera_varios_ciclos_antes_de_apagarse() {
        assert!(master::monitor::SHUTDOWN_GRACE >= 3 * WAIT_INTERVAL);
    }

    #[tokio::test]
    async fn map_sin_input_es_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let w = worker(tmp.path());

        let err = w
            .run_map(&MapTask {
                index: 0,
                input_path: tmp.path().join("no_existe").to_string_lossy().to_string(),
                n_reduce: 2,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("map #0"));
    }

    #[tokio::test]
    async fn reduce_con_shard_corrupto_es_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("mr-0-0"), "basura\n").unwrap();
        let w = worker(tmp.path());

        let res = w
            .run_reduce(&ReduceTask {
                index: 0,
                n_map: 1,
                n_reduce: 1,
            })
            .await;
        assert!(res.is_err());
        assert!(!tmp.path().join("mr-out-0").exists());
    }
}
