//! # Conversão entre Codepoints e Bytes
//!
//! Os anotadores trabalham em índices de codepoint, mas `&str` do Rust é
//! indexado por bytes. [`CodepointText`] guarda as duas visões juntas: o texto
//! e a tabela `codepoint -> byte` calculada uma única vez.
//!
//! ```text
//! Texto:     "R$ 5 é"
//! Codepoint:  0 1 2 3 4 5
//! Byte:       0 1 2 3 4 5-6
//! ```

use crate::types::CodepointSpan;

/// Texto emprestado com índice de codepoints.
#[derive(Debug, Clone)]
pub struct CodepointText<'a> {
    text: &'a str,
    /// `offsets[i]` = byte inicial do codepoint `i`; o último elemento é `text.len()`.
    offsets: Vec<usize>,
}

impl<'a> CodepointText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn len_codepoints(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte inicial do codepoint `index`. Índices além do fim são saturados em `text.len()`.
    pub fn byte_offset(&self, index: usize) -> usize {
        self.offsets
            .get(index)
            .copied()
            .unwrap_or(self.text.len())
    }

    /// Índice do codepoint que começa no byte `byte`, ou o que o contém.
    pub fn codepoint_index(&self, byte: usize) -> usize {
        match self.offsets.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        if index >= self.len_codepoints() {
            return None;
        }
        self.text[self.offsets[index]..].chars().next()
    }

    /// Substring correspondente a um span de codepoints.
    pub fn substring(&self, span: CodepointSpan) -> &'a str {
        let start = self.byte_offset(span.start);
        let end = self.byte_offset(span.end).max(start);
        &self.text[start..end]
    }

    /// Resto do texto a partir do codepoint `index`.
    pub fn suffix_from(&self, index: usize) -> &'a str {
        &self.text[self.byte_offset(index)..]
    }

    pub fn chars(&self, span: CodepointSpan) -> std::str::Chars<'a> {
        self.substring(span).chars()
    }
}

/// Número de codepoints em uma string.
pub fn num_codepoints(text: &str) -> usize {
    text.chars().count()
}

/// Tamanho em bytes de um caractere UTF-8 a partir do seu primeiro byte.
///
/// Bytes de continuação (`10xxxxxx`) e bytes inválidos contam como 1 para que
/// a varredura sempre avance.
pub fn utf8_char_len(first_byte: u8) -> usize {
    match first_byte {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}
