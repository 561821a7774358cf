//! # Tokenização com Offsets em Codepoints
//!
//! Divide o texto bruto em tokens. Cada token guarda sua posição no texto
//! original em **codepoints** (não bytes), que é a unidade dos spans
//! devolvidos pelos anotadores.
//!
//! ## Esquemas de Tokenização
//!
//! - **Whitespace**: separa apenas por espaços. Mantém juntos "R$5,00", "13." e
//!   "99%", que é o que o anotador numérico espera.
//! - **WordBoundary**: fronteiras de palavra Unicode (UAX #29). Pontuação vira
//!   token próprio; útil para dicionários de termos.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use anota_core::tokenizer::{tokenize_with_mode, TokenizerMode};
//!
//! let tokens = tokenize_with_mode("Custa 5% ao mês.", TokenizerMode::Whitespace);
//! assert_eq!(tokens[1].value, "5%");
//! assert_eq!((tokens[1].start, tokens[1].end), (6, 8));
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::types::CodepointSpan;
use crate::unilib;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// O texto do token (ex: "3,14", "york").
    pub value: String,
    /// Codepoint inicial no texto original (inclusive).
    pub start: usize,
    /// Codepoint final no texto original (exclusivo).
    pub end: usize,
    /// Token artificial de preenchimento (fora do texto).
    pub is_padding: bool,
}

impl Token {
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            start,
            end,
            is_padding: false,
        }
    }

    /// Token de preenchimento: sem texto e com span vazio.
    pub fn padding() -> Self {
        Self {
            is_padding: true,
            ..Default::default()
        }
    }

    pub fn span(&self) -> CodepointSpan {
        CodepointSpan::new(self.start, self.end)
    }
}

/// Estratégias de tokenização disponíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// **Espaços**: separa apenas por espaço em branco.
    #[default]
    Whitespace,
    /// **Fronteira de palavra**: segmentação Unicode; pontuação isolada.
    WordBoundary,
}

/// Colaborador de tokenização consumido pelos anotadores.
///
/// Deve devolver tokens ordenados, sem sobreposição, com offsets em codepoints.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

impl Tokenizer for TokenizerMode {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize_with_mode(text, *self)
    }
}

/// Tokeniza um texto usando o modo padrão (espaços).
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with_mode(text, TokenizerMode::Whitespace)
}

/// Tokeniza um texto com o modo especificado.
pub fn tokenize_with_mode(text: &str, mode: TokenizerMode) -> Vec<Token> {
    match mode {
        TokenizerMode::Whitespace => tokenize_whitespace(text),
        TokenizerMode::WordBoundary => tokenize_word_boundary(text),
    }
}

fn tokenize_whitespace(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_start = 0;

    for (i, ch) in text.chars().enumerate() {
        if unilib::is_whitespace(ch) {
            flush_token(&mut tokens, &mut current, current_start, i);
        } else {
            if current.is_empty() {
                current_start = i;
            }
            current.push(ch);
        }
    }

    let end = current_start + current.chars().count();
    flush_token(&mut tokens, &mut current, current_start, end);
    tokens
}

fn tokenize_word_boundary(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut codepoint = 0;

    for segment in text.split_word_bounds() {
        let len = segment.chars().count();
        if !segment.chars().all(unilib::is_whitespace) {
            tokens.push(Token::new(segment, codepoint, codepoint + len));
        }
        codepoint += len;
    }
    tokens
}

/// Fecha o token acumulado e adiciona à lista (se não vazio)
fn flush_token(tokens: &mut Vec<Token>, value: &mut String, start: usize, end: usize) {
    if !value.is_empty() {
        tokens.push(Token::new(value.clone(), start, end));
        value.clear();
    }
}
