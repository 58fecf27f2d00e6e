//! Piezas de ejecución que comparten el worker distribuido y el modo
//! secuencial del cliente: map de un archivo, agrupado/reduce de una
//! partición y escritura de la salida final.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::{apps::MapReduceApp, intermediate, task::TaskIndex, KeyValue};

/// Lee `input_path` completo y aplica la función map.
pub fn map_file(app: &dyn MapReduceApp, input_path: &str) -> io::Result<Vec<KeyValue>> {
    let bytes = fs::read(input_path)?;
    let contents = String::from_utf8_lossy(&bytes);
    Ok(app.map(input_path, &contents))
}

/// Ordena por clave y llama a reduce una vez por clave distinta.
/// Devuelve pares (clave, valor reducido) en orden ascendente de clave.
pub fn reduce_records(app: &dyn MapReduceApp, mut records: Vec<KeyValue>) -> Vec<(String, String)> {
    records.sort_by(|a, b| a.key.cmp(&b.key));

    let mut out = Vec::new();
    let mut i = 0;
    while i < records.len() {
        let mut j = i + 1;
        while j < records.len() && records[j].key == records[i].key {
            j += 1;
        }
        let values: Vec<String> = records[i..j].iter().map(|kv| kv.value.clone()).collect();
        let reduced = app.reduce(&records[i].key, &values);
        out.push((records[i].key.clone(), reduced));
        i = j;
    }
    out
}

fn write_lines<W: Write>(w: &mut W, results: &[(String, String)]) -> io::Result<()> {
    for (key, value) in results {
        writeln!(w, "{} {}", key, value)?;
    }
    w.flush()
}

/// Escribe `mr-out-<reduce_index>` en `dir`, una línea "clave valor" por clave.
pub fn write_output(
    dir: &Path,
    reduce_index: TaskIndex,
    results: &[(String, String)],
) -> io::Result<PathBuf> {
    let name = intermediate::output_file_name(reduce_index);
    intermediate::write_atomically(dir, &name, |w| write_lines(w, results))
}

/// Ejecuta el job completo en un solo proceso, sin particionar, y escribe
/// todo en `output_path`. Sirve como referencia para validar la salida
/// distribuida. Devuelve la cantidad de claves distintas.
pub fn run_sequential(
    app: &dyn MapReduceApp,
    inputs: &[String],
    output_path: &Path,
) -> io::Result<usize> {
    let mut records = Vec::new();
    for input in inputs {
        let mut kvs = map_file(app, input)?;
        records.append(&mut kvs);
    }

    let results = reduce_records(app, records);

    let dir = output_path.parent().unwrap_or_else(|| Path::new("."));
    let name = output_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "ruta de salida sin nombre"))?;
    intermediate::write_atomically(dir, name, |w| write_lines(w, &results))?;

    Ok(results.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::{grep::Grep, wc::WordCount};

    #[test]
    fn reduce_records_agrupa_claves_iguales_en_orden() {
        let records = vec![
            KeyValue::new("b", "1"),
            KeyValue::new("a", "1"),
            KeyValue::new("c", "1"),
            KeyValue::new("a", "1"),
        ];

        let out = reduce_records(&WordCount, records);
        assert_eq!(
            out,
            vec![
                ("a".to_string(), "2".to_string()),
                ("b".to_string(), "1".to_string()),
                ("c".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn reduce_records_sin_registros_no_produce_nada() {
        assert!(reduce_records(&WordCount, Vec::new()).is_empty());
    }

    #[test]
    fn write_output_usa_formato_clave_espacio_valor() {
        let tmp = tempfile::tempdir().unwrap();
        let results = vec![
            ("a".to_string(), "6".to_string()),
            ("b".to_string(), "3".to_string()),
        ];

        let path = write_output(tmp.path(), 1, &results).unwrap();

        assert_eq!(path, tmp.path().join("mr-out-1"));
        assert_eq!(fs::read_to_string(path).unwrap(), "a 6\nb 3\n");
    }

    #[test]
    fn map_file_falla_si_no_existe_el_input() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("no_existe.txt");
        let err = map_file(&WordCount, missing.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn run_sequential_cuenta_palabras_de_varios_archivos() {
        let tmp = tempfile::tempdir().unwrap();
        let mut inputs = Vec::new();
        for i in 0..3 {
            let p = tmp.path().join(format!("in-{i}.txt"));
            fs::write(&p, "a b a\n").unwrap();
            inputs.push(p.to_string_lossy().to_string());
        }
        let out = tmp.path().join("mr-out-0");

        let keys = run_sequential(&WordCount, &inputs, &out).unwrap();

        assert_eq!(keys, 2);
        assert_eq!(fs::read_to_string(out).unwrap(), "a 6\nb 3\n");
    }

    #[test]
    fn run_sequential_grep_sin_coincidencias_deja_salida_vacia() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("log.txt");
        fs::write(&input, "uno\ndos\n").unwrap();
        let out = tmp.path().join("mr-out-0");

        let keys = run_sequential(
            &Grep::new("tres"),
            &[input.to_string_lossy().to_string()],
            &out,
        )
        .unwrap();

        assert_eq!(keys, 0);
        assert!(fs::read_to_string(out).unwrap().is_empty());
    }
}
