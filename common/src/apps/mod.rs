//! Aplicaciones map/reduce incluidas con el sistema.
//!
//! El núcleo (master + workers) las trata como una caja negra: sólo conoce
//! el trait [`MapReduceApp`].

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::KeyValue;

pub mod grep;
pub mod wc;

/// Par de funciones de usuario que ejecuta un worker.
pub trait MapReduceApp: Send + Sync {
    /// `filename` es el identificador del input, `contents` su contenido completo.
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue>;

    /// Se llama una vez por clave distinta con todos sus valores.
    fn reduce(&self, key: &str, values: &[String]) -> String;
}

/// Busca una aplicación por nombre ("wc", "grep").
pub fn named(name: &str) -> Result<Arc<dyn MapReduceApp>> {
    match name {
        "wc" => Ok(Arc::new(wc::WordCount)),
        "grep" => Ok(Arc::new(grep::Grep::from_env()?)),
        _ => bail!("no existe una aplicación llamada `{}`", name),
    }
}
