//! # Normalizador de Texto
//!
//! Canonicaliza texto codepoint a codepoint: remove diacríticos, expande
//! ligaduras e, opcionalmente, converte para minúsculas. É o que faz
//! "SÃO PAULO", "São Paulo" e "sao paulo" caírem na mesma chave de dicionário.
//!
//! ## Mapa de índices
//!
//! Como um codepoint pode virar vários (ex: 'ß' -> "ss") ou nenhum (marcas
//! combinantes), o normalizador pode devolver um mapa de índices: para cada
//! byte da saída, o byte inicial do codepoint de entrada que o gerou, mais uma
//! entrada final igual ao tamanho da entrada.
//!
//! ```text
//! entrada: "Straße"      saída: "strasse"
//! mapa:    [0,1,2,3,4,4,6,7]   // os dois 's' de "ss" apontam para o byte 4 ('ß')
//! ```

use crate::normalization_table;
use crate::unilib;
use crate::utf8::utf8_char_len;

/// Resultado de [`Normalizer::normalize_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// `index_map.len() == text.len() + 1` quando solicitado.
    pub index_map: Option<Vec<usize>>,
}

/// Normalizador leve para texto latino.
///
/// Não guarda estado além da tabela global imutável; pode ser copiado e
/// compartilhado entre threads livremente.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normaliza um `&str`.
    pub fn normalize(&self, input: &str, fold_case: bool) -> String {
        self.normalize_bytes(input.as_bytes(), fold_case, false).text
    }

    /// Normaliza e devolve o mapa de índices saída -> entrada.
    pub fn normalize_with_index_map(&self, input: &str, fold_case: bool) -> (String, Vec<usize>) {
        let Normalized { text, index_map } = self.normalize_bytes(input.as_bytes(), fold_case, true);
        (text, index_map.unwrap_or_default())
    }

    /// Contrato em bytes: UTF-8 inválido ou truncado interrompe a normalização
    /// naquele ponto, sem erro.
    pub fn normalize_bytes(&self, input: &[u8], fold_case: bool, want_index_map: bool) -> Normalized {
        let mut output = String::with_capacity(input.len());
        let mut index_map = want_index_map.then(|| Vec::with_capacity(input.len() + 1));
        let mut pos = 0;

        while pos < input.len() {
            let char_len = utf8_char_len(input[pos]);
            if pos + char_len > input.len() {
                break;
            }
            let Some(c) = decode_char(&input[pos..pos + char_len]) else {
                break;
            };

            let before = output.len();
            match normalization_table::lookup(c) {
                Some(replacement) if fold_case => {
                    output.extend(replacement.chars().map(unilib::to_lower));
                }
                Some(replacement) => output.push_str(replacement),
                None if fold_case => output.push(unilib::to_lower(c)),
                None => output.push(c),
            }

            if let Some(map) = index_map.as_mut() {
                map.extend(std::iter::repeat(pos).take(output.len() - before));
            }
            pos += char_len;
        }

        if let Some(map) = index_map.as_mut() {
            map.push(input.len());
        }
        Normalized {
            text: output,
            index_map,
        }
    }
}

fn decode_char(bytes: &[u8]) -> Option<char> {
    std::str::from_utf8(bytes).ok()?.chars().next()
}
