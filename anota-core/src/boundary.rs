//! # Remoção de Codepoints de Fronteira
//!
//! Antes de comparar um trecho com o dicionário ou de interpretá-lo como
//! número, removemos pontuação irrelevante das bordas:
//!
//! ```text
//! "(São Paulo)," --strip--> "São Paulo"
//! "13."          --strip--> "13"
//! ```
//!
//! A operação só encolhe o span; nunca o expande.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::CodepointSpan;
use crate::utf8::CodepointText;

/// Conjunto de codepoints (ex: pontuação a ignorar, prefixos permitidos).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodepointSet(HashSet<char>);

impl CodepointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrói a partir de codepoints inteiros, como vêm da configuração.
    pub fn from_codepoints(codepoints: &[u32]) -> Result<Self> {
        codepoints
            .iter()
            .map(|&cp| char::from_u32(cp).ok_or(Error::InvalidCodepoint(cp)))
            .collect::<Result<HashSet<char>>>()
            .map(Self)
    }

    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    pub fn insert(&mut self, c: char) {
        self.0.insert(c);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<char> for CodepointSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> From<&'a str> for CodepointSet {
    fn from(chars: &'a str) -> Self {
        chars.chars().collect()
    }
}

/// Encolhe `span` removendo codepoints de `prefix` no início e de `suffix` no fim.
///
/// Se nada sobrar, devolve o span vazio `[span.start, span.start)`.
pub fn strip_boundary_codepoints(
    text: &CodepointText<'_>,
    span: CodepointSpan,
    prefix: &CodepointSet,
    suffix: &CodepointSet,
) -> CodepointSpan {
    if span.is_empty() {
        return CodepointSpan::new(span.start, span.start);
    }

    let num_leading = text
        .chars(span)
        .take_while(|&c| prefix.contains(c))
        .count();
    let num_trailing = text
        .chars(span)
        .rev()
        .take_while(|&c| suffix.contains(c))
        .count();

    if span.start + num_leading < span.end.saturating_sub(num_trailing) {
        CodepointSpan::new(span.start + num_leading, span.end - num_trailing)
    } else {
        CodepointSpan::new(span.start, span.start)
    }
}

/// Configuração serializável dos codepoints ignorados nas bordas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryOptions {
    pub ignored_prefix_span_boundary_codepoints: Vec<u32>,
    pub ignored_suffix_span_boundary_codepoints: Vec<u32>,
}

/// Os dois conjuntos de fronteira usados por um anotador.
#[derive(Debug, Clone, Default)]
pub struct BoundaryStripper {
    prefix: CodepointSet,
    suffix: CodepointSet,
}

impl BoundaryStripper {
    pub fn new(prefix: CodepointSet, suffix: CodepointSet) -> Self {
        Self { prefix, suffix }
    }

    /// Mesmo conjunto nas duas pontas.
    pub fn symmetric(chars: &str) -> Self {
        Self::new(CodepointSet::from(chars), CodepointSet::from(chars))
    }

    pub fn from_options(options: &BoundaryOptions) -> Result<Self> {
        Ok(Self::new(
            CodepointSet::from_codepoints(&options.ignored_prefix_span_boundary_codepoints)?,
            CodepointSet::from_codepoints(&options.ignored_suffix_span_boundary_codepoints)?,
        ))
    }

    pub fn prefix(&self) -> &CodepointSet {
        &self.prefix
    }

    pub fn suffix(&self) -> &CodepointSet {
        &self.suffix
    }

    pub fn strip(&self, text: &CodepointText<'_>, span: CodepointSpan) -> CodepointSpan {
        strip_boundary_codepoints(text, span, &self.prefix, &self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_both_ends() {
        let text = CodepointText::new("(São Paulo),");
        let stripper = BoundaryStripper::symmetric("(),");
        let span = stripper.strip(&text, CodepointSpan::new(0, 12));
        assert_eq!(span, CodepointSpan::new(1, 10));
        assert_eq!(text.substring(span), "São Paulo");
    }

    #[test]
    fn test_strip_is_side_specific() {
        let text = CodepointText::new("$13.");
        let prefix = CodepointSet::from("$");
        let suffix = CodepointSet::from(".");
        let span = strip_boundary_codepoints(&text, CodepointSpan::new(0, 4), &prefix, &suffix);
        assert_eq!(span, CodepointSpan::new(1, 3));

        // '.' não está nos prefixos: nada sai do início
        let text = CodepointText::new(".5");
        let span = strip_boundary_codepoints(&text, CodepointSpan::new(0, 2), &prefix, &suffix);
        assert_eq!(span, CodepointSpan::new(0, 2));
    }

    #[test]
    fn test_strip_everything_gives_empty_span() {
        let text = CodepointText::new("a ... b");
        let stripper = BoundaryStripper::symmetric(".");
        assert_eq!(
            stripper.strip(&text, CodepointSpan::new(2, 5)),
            CodepointSpan::new(2, 2)
        );
    }

    #[test]
    fn test_invalid_codepoint_is_config_error() {
        assert!(CodepointSet::from_codepoints(&[0x25, 0x24]).is_ok());
        assert!(matches!(
            CodepointSet::from_codepoints(&[0xD800]),
            Err(Error::InvalidCodepoint(0xD800))
        ));
    }

    #[test]
    fn test_stripper_from_options() {
        let options: BoundaryOptions = serde_json::from_str(
            r#"{"ignored_prefix_span_boundary_codepoints": [40], "ignored_suffix_span_boundary_codepoints": [41, 46]}"#,
        )
        .unwrap();
        let stripper = BoundaryStripper::from_options(&options).unwrap();
        assert!(stripper.prefix().contains('('));
        assert!(!stripper.prefix().contains(')'));
        assert_eq!(stripper.suffix().len(), 2);

        let text = CodepointText::new("(42).");
        assert_eq!(stripper.strip(&text, CodepointSpan::new(0, 5)), CodepointSpan::new(1, 3));

        // Campos ausentes viram conjuntos vazios
        let empty = BoundaryStripper::from_options(&BoundaryOptions::default()).unwrap();
        assert!(empty.prefix().is_empty() && empty.suffix().is_empty());
    }

    #[test]
    fn test_stripper_from_options_rejects_surrogate() {
        let options = BoundaryOptions {
            ignored_prefix_span_boundary_codepoints: vec![0x28],
            ignored_suffix_span_boundary_codepoints: vec![0xDFFF],
        };
        assert!(matches!(
            BoundaryStripper::from_options(&options),
            Err(Error::InvalidCodepoint(0xDFFF))
        ));
    }
}
