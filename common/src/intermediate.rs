//! Protocolo de almacenamiento intermedio entre maps y reduces.
//!
//! Cada tarea de map `m` deja, por cada partición `r` no vacía, un archivo
//! `mr-<m>-<r>` con un registro JSON por línea. La tarea de reduce `r` lee
//! `mr-0-r` .. `mr-<n_map-1>-r`; un archivo ausente equivale a cero registros.
//! Para que un shard viejo (de otro job en el mismo directorio) no se lea
//! como propio, el map borra `mr-<m>-<r>` de las particiones que quedan vacías.
//!
//! Todos los archivos se publican con escritura a un temporal privado en el
//! mismo directorio + rename, así un lector nunca ve un archivo a medias. Si
//! dos workers escriben el mismo shard (reasignación), gana el último rename.

use fnv::FnvHasher;
use std::{
    fs::{self, File},
    hash::Hasher,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::{task::TaskIndex, KeyValue};

pub fn intermediate_file_name(map_index: TaskIndex, reduce_index: TaskIndex) -> String {
    format!("mr-{}-{}", map_index, reduce_index)
}

pub fn output_file_name(reduce_index: TaskIndex) -> String {
    format!("mr-out-{}", reduce_index)
}

/// Hash estable de una clave: FNV-1a de 64 bits enmascarado a 31 bits. No
/// depende del proceso ni de la versión del compilador, así todos los workers
/// particionan igual.
///
/// Ojo: no es FNV-1a de 32 bits, así que la partición de cada clave no
/// coincide con la de implementaciones que usan la variante de 32 bits.
pub fn ihash(key: &str) -> u32 {
    let mut h = FnvHasher::default();
    h.write(key.as_bytes());
    (h.finish() & 0x7fff_ffff) as u32
}

/// Partición (tarea de reduce) a la que pertenece `key`.
pub fn partition_for(key: &str, n_reduce: usize) -> TaskIndex {
    ihash(key) as usize % n_reduce
}

/// Escribe `dir/name` de forma atómica: temporal en `dir`, flush y rename.
pub fn write_atomically<F>(dir: &Path, name: &str, write: F) -> io::Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<NamedTempFile>) -> io::Result<()>,
{
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(tmp);
    write(&mut writer)?;

    let tmp = writer.into_inner().map_err(|e| e.into_error())?;
    let path = dir.join(name);
    tmp.persist(&path).map_err(|e| e.error)?;
    Ok(path)
}

/// Reparte los registros de la tarea de map `map_index` en `n_reduce`
/// particiones y escribe un archivo por partición no vacía. Si una partición
/// queda vacía se borra un `mr-<m>-<r>` previo que hubiera en `dir`.
/// Devuelve las rutas escritas.
pub fn write_partitions(
    dir: &Path,
    map_index: TaskIndex,
    n_reduce: usize,
    records: Vec<KeyValue>,
) -> io::Result<Vec<PathBuf>> {
    if n_reduce == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "n_reduce debe ser mayor que 0",
        ));
    }

    let mut buckets: Vec<Vec<KeyValue>> = (0..n_reduce).map(|_| Vec::new()).collect();
    for kv in records {
        let pid = partition_for(&kv.key, n_reduce);
        buckets[pid].push(kv);
    }

    let mut written = Vec::new();
    for (reduce_index, bucket) in buckets.iter().enumerate() {
        let name = intermediate_file_name(map_index, reduce_index);
        if bucket.is_empty() {
            match fs::remove_file(dir.join(&name)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
            continue;
        }
        let path = write_atomically(dir, &name, |w| {
            for kv in bucket {
                serde_json::to_writer(&mut *w, kv)?;
                w.write_all(b"\n")?;
            }
            w.flush()
        })?;
        written.push(path);
    }

    Ok(written)
}

/// Lee un archivo intermedio (JSONL). Un registro malformado es un error
/// `InvalidData`.
pub fn read_partition(path: &Path) -> io::Result<Vec<KeyValue>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let kv: KeyValue = serde_json::from_str(&line).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("registro inválido en {}: {e}", path.display()),
            )
        })?;
        out.push(kv);
    }

    Ok(out)
}

/// Junta todos los registros de la partición `reduce_index` producidos por
/// las `n_map` tareas de map. Shards inexistentes se saltan.
pub fn read_reduce_input(
    dir: &Path,
    reduce_index: TaskIndex,
    n_map: usize,
) -> io::Result<Vec<KeyValue>> {
    let mut all = Vec::new();
    for map_index in 0..n_map {
        let path = dir.join(intermediate_file_name(map_index, reduce_index));
        match read_partition(&path) {
            Ok(mut recs) => all.append(&mut recs),
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(all)
}
