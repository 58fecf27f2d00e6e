use anyhow::{bail, Result};
use std::env;

use super::MapReduceApp;
use crate::KeyValue;

pub const PATTERN_ENV: &str = "MR_GREP_PATTERN";

/// Busca las líneas que contienen un patrón fijo (substring, sin regex).
///
/// Cada coincidencia se emite con clave = patrón y valor
/// `"<archivo>:<línea>:<contenido>"`; el reduce las ordena y las une con `\n`.
pub struct Grep {
    pattern: String,
}

impl Grep {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Lee el patrón desde `MR_GREP_PATTERN`.
    pub fn from_env() -> Result<Self> {
        match env::var(PATTERN_ENV) {
            Ok(p) if !p.is_empty() => Ok(Self::new(p)),
            _ => bail!("definir {} con el texto a buscar", PATTERN_ENV),
        }
    }
}

impl MapReduceApp for Grep {
    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue> {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains(&self.pattern))
            .map(|(i, line)| {
                KeyValue::new(
                    self.pattern.clone(),
                    format!("{}:{}:{}", filename, i + 1, line),
                )
            })
            .collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let mut values = values.to_vec();
        values.sort();
        values.join("\n")
    }
}
