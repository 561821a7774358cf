//! # Tabela de Strings Ordenadas
//!
//! Dicionário compacto de sufixos (ex: "%", " por cento", "pct") usado para
//! achar o **maior prefixo** de um texto que é uma entrada da tabela.
//!
//! ## Formato serializado
//!
//! Um blob único com as peças terminadas em `\0` e um vetor de offsets, um por
//! peça, apontando para o início de cada uma. As peças devem estar em ordem
//! lexicográfica de bytes.
//!
//! ```text
//! blob:    "%\0pct\0percent\0"
//! offsets: [0, 2, 6]
//! ```
//!
//! ## Busca
//!
//! A cada byte do texto estreitamos, por busca binária, o intervalo de peças
//! que ainda compartilham o prefixo lido. Se a primeira peça do intervalo
//! termina exatamente ali, temos um match.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct SortedStringsTable {
    blob: Vec<u8>,
    /// Intervalos `[start, end)` de cada peça dentro do blob.
    pieces: Vec<(usize, usize)>,
}

impl SortedStringsTable {
    /// Constrói a partir da forma serializada (blob + offsets).
    pub fn from_serialized(blob: &[u8], offsets: &[u32]) -> Result<Self> {
        let mut pieces = Vec::with_capacity(offsets.len());
        for &offset in offsets {
            let start = offset as usize;
            if start > blob.len() {
                return Err(Error::invalid_config(format!(
                    "offset {start} fora do blob de {} bytes",
                    blob.len()
                )));
            }
            let end = blob[start..]
                .iter()
                .position(|&b| b == 0)
                .map(|p| start + p)
                .unwrap_or(blob.len());
            pieces.push((start, end));
        }

        let table = Self {
            blob: blob.to_vec(),
            pieces,
        };
        if table.pieces.windows(2).any(|w| table.bytes(w[0]) > table.bytes(w[1])) {
            return Err(Error::invalid_config("peças da tabela fora de ordem"));
        }
        Ok(table)
    }

    /// Ordena e empacota uma lista de peças.
    pub fn from_pieces<S: AsRef<str>>(pieces: &[S]) -> Self {
        let mut sorted: Vec<&str> = pieces.iter().map(|p| p.as_ref()).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut blob = Vec::new();
        let mut ranges = Vec::with_capacity(sorted.len());
        for piece in sorted {
            let start = blob.len();
            blob.extend_from_slice(piece.as_bytes());
            ranges.push((start, blob.len()));
            blob.push(0);
        }
        Self {
            blob,
            pieces: ranges,
        }
    }

    /// Forma serializada: blob com terminadores e offsets.
    pub fn to_serialized(&self) -> (Vec<u8>, Vec<u32>) {
        let offsets = self.pieces.iter().map(|&(start, _)| start as u32).collect();
        (self.blob.clone(), offsets)
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    fn bytes(&self, (start, end): (usize, usize)) -> &[u8] {
        &self.blob[start..end]
    }

    fn piece(&self, index: usize) -> &[u8] {
        self.bytes(self.pieces[index])
    }

    /// Tamanho em bytes do maior prefixo de `text` presente na tabela.
    pub fn longest_prefix_match(&self, text: &str) -> Option<usize> {
        let input = text.as_bytes();
        let mut lo = 0;
        let mut hi = self.pieces.len();
        let mut best = None;

        // Peça vazia casa com qualquer texto
        while lo < hi && self.piece(lo).is_empty() {
            best = Some(0);
            lo += 1;
        }

        for (depth, &byte) in input.iter().enumerate() {
            if lo >= hi {
                break;
            }
            // Dentro de [lo, hi) todas as peças têm o mesmo prefixo de tamanho `depth`
            // e comprimento > depth, então ordenam pelo byte em `depth`.
            lo += self.pieces[lo..hi].partition_point(|&p| self.bytes(p)[depth] < byte);
            hi = lo + self.pieces[lo..hi].partition_point(|&p| self.bytes(p)[depth] <= byte);
            if lo >= hi {
                break;
            }
            while lo < hi && self.piece(lo).len() == depth + 1 {
                best = Some(depth + 1);
                lo += 1;
            }
        }
        best
    }

    /// Busca exata.
    pub fn find(&self, text: &str) -> Option<usize> {
        self.pieces
            .binary_search_by(|&p| self.bytes(p).cmp(text.as_bytes()))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SortedStringsTable {
        SortedStringsTable::from_pieces(&["%", "pct", "percent", " por cento", "por"])
    }

    #[test]
    fn test_longest_prefix_match() {
        let t = table();
        assert_eq!(t.longest_prefix_match("% ao ano"), Some(1));
        assert_eq!(t.longest_prefix_match("percentage"), Some(7));
        assert_eq!(t.longest_prefix_match("pct."), Some(3));
        assert_eq!(t.longest_prefix_match(" por cento"), Some(10));
        assert_eq!(t.longest_prefix_match("porcento"), Some(3));
        assert_eq!(t.longest_prefix_match("pe"), None);
        assert_eq!(t.longest_prefix_match("x%"), None);
        assert_eq!(t.longest_prefix_match(""), None);
    }

    #[test]
    fn test_serialized_roundtrip_lookup() {
        let (blob, offsets) = table().to_serialized();
        let t = SortedStringsTable::from_serialized(&blob, &offsets).unwrap();
        assert_eq!(t.len(), 5);
        assert_eq!(t.find("pct"), table().find("pct"));
        assert!(t.find("pc").is_none());
        assert_eq!(t.longest_prefix_match("percent!"), Some(7));
    }

    #[test]
    fn test_serialized_validation() {
        assert!(SortedStringsTable::from_serialized(b"b\0a\0", &[0, 2]).is_err());
        assert!(SortedStringsTable::from_serialized(b"a\0", &[9]).is_err());
        // Sem terminador final
        let t = SortedStringsTable::from_serialized(b"%\0pct", &[0, 2]).unwrap();
        assert_eq!(t.longest_prefix_match("pct"), Some(3));
    }

    #[test]
    fn test_multibyte_piece() {
        let t = SortedStringsTable::from_pieces(&["‰", "%"]);
        assert_eq!(t.longest_prefix_match("‰ x"), Some("‰".len()));
    }
}
