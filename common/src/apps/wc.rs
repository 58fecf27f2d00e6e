use super::MapReduceApp;
use crate::KeyValue;

/// Conteo de palabras. Una palabra es una secuencia maximal de letras.
pub struct WordCount;

impl MapReduceApp for WordCount {
    fn map(&self, _filename: &str, contents: &str) -> Vec<KeyValue> {
        contents
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(|w| KeyValue::new(w, "1"))
            .collect()
    }

    fn reduce(&self, _key: &str, values: &[String]) -> String {
        values.len().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emite_un_uno_por_palabra() {
        let kvs = WordCount.map("in.txt", "Hola hola, mundo!!\nmundo_prueba");
        let keys: Vec<&str> = kvs.iter().map(|kv| kv.key.as_str()).collect();

        assert_eq!(keys, vec!["Hola", "hola", "mundo", "mundo", "prueba"]);
        assert!(kvs.iter().all(|kv| kv.value == "1"));
    }

    #[test]
    fn map_de_texto_vacio_no_emite_nada() {
        assert!(WordCount.map("vacio.txt", "").is_empty());
        assert!(WordCount.map("vacio.txt", " 123 ,, \n").is_empty());
    }

    #[test]
    fn reduce_cuenta_valores() {
        let values = vec!["1".to_string(); 6];
        assert_eq!(WordCount.reduce("a", &values), "6");
    }
}
