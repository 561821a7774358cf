//! # Anotador de Números
//!
//! Encontra literais numéricos em texto tokenizado e, opcionalmente, promove
//! números seguidos de um sufixo de porcentagem ("%", " por cento", "pct")
//! à coleção `Percentage`.
//!
//! ## Anatomia de um token
//!
//! ```text
//! token:   ( R$ -1.250 k ) .
//!           │ │  │      │ └┴─ fronteira ignorada (removida antes de tudo)
//!           │ │  │      └──── sufixo permitido (fora do span final)
//!           │ │  └─────────── número: sinal, parte inteira, parte decimal
//!           │ └────────────── prefixo permitido (fora do span final)
//!           └──────────────── fronteira ignorada
//! ```
//!
//! ## Parser
//!
//! Autômato de três estados sobre os codepoints restantes:
//!
//! ```text
//! PARTE_INTEIRA --('.' ou ',')--> PARTE_DECIMAL
//!       │                              │
//!       └──(não dígito)──> FIM <──(não dígito)
//! ```
//!
//! Os acumuladores são `i64` protegidos contra overflow: antes de cada dígito,
//! se o acumulador passa de `i64::MAX / 10 - 10`, a leitura para. Overflow na
//! parte inteira rejeita o token; na parte decimal encerra a leitura e o dígito
//! não consumido reprova a checagem de sufixo.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::boundary::{BoundaryOptions, BoundaryStripper, CodepointSet};
use crate::error::Result;
use crate::sorted_strings::SortedStringsTable;
use crate::tokenizer::{Tokenizer, TokenizerMode};
use crate::types::{collections, AnnotatedSpan, AnnotationUsecase, ClassificationResult, CodepointSpan};
use crate::unilib;
use crate::utf8::{num_codepoints, CodepointText};

/// Configuração do anotador de números.
///
/// Codepoints são inteiros (`u32`), como no arquivo de configuração; a
/// validação acontece em [`NumberAnnotator::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberAnnotatorOptions {
    pub enabled: bool,
    /// Máscara de bits de [`AnnotationUsecase`].
    pub enabled_annotation_usecases: u32,
    pub score: f32,
    /// Prioridade de números inteiros.
    pub priority_score: f32,
    /// Prioridade de números com parte decimal.
    pub float_number_priority_score: f32,
    pub percentage_priority_score: f32,
    pub enable_percentage: bool,
    pub allowed_prefix_codepoints: Vec<u32>,
    pub allowed_suffix_codepoints: Vec<u32>,
    /// Pontuação ignorada nas bordas dos tokens e das seleções.
    #[serde(flatten)]
    pub boundary: BoundaryOptions,
    /// Blob de sufixos de porcentagem terminados em `\0`, em ordem de bytes.
    pub percentage_pieces_string: String,
    pub percentage_pieces_offsets: Vec<u32>,
    /// Alternativa legível ao blob; usada só quando o blob está vazio.
    pub percentage_pieces: Vec<String>,
}

impl Default for NumberAnnotatorOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            enabled_annotation_usecases: u32::MAX,
            score: 1.0,
            priority_score: -10.0,
            float_number_priority_score: 1.0,
            percentage_priority_score: 1.0,
            enable_percentage: false,
            allowed_prefix_codepoints: Vec::new(),
            allowed_suffix_codepoints: Vec::new(),
            boundary: BoundaryOptions::default(),
            percentage_pieces_string: String::new(),
            percentage_pieces_offsets: Vec::new(),
            percentage_pieces: Vec::new(),
        }
    }
}

impl NumberAnnotatorOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Resultado de [`NumberAnnotator::parse_number`] para um token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedNumber {
    pub int_value: i64,
    pub double_value: f64,
    pub has_decimal: bool,
    /// Codepoints no início do token que ficam fora do span (fronteira + prefixo).
    pub num_prefix_codepoints: usize,
    /// Codepoints no fim do token que ficam fora do span (sufixo + fronteira).
    pub num_suffix_codepoints: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    WholePart,
    FloatingPart,
    Done,
}

/// Anotador de números e porcentagens. Imutável após a construção.
#[derive(Clone)]
pub struct NumberAnnotator {
    options: NumberAnnotatorOptions,
    tokenizer: Arc<dyn Tokenizer>,
    allowed_prefix: CodepointSet,
    allowed_suffix: CodepointSet,
    stripper: BoundaryStripper,
    percentage_suffixes: SortedStringsTable,
}

impl fmt::Debug for NumberAnnotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberAnnotator")
            .field("options", &self.options)
            .field("percentage_suffixes", &self.percentage_suffixes.len())
            .finish_non_exhaustive()
    }
}

impl NumberAnnotator {
    /// Cria o anotador com o tokenizador por espaços.
    pub fn new(options: NumberAnnotatorOptions) -> Result<Self> {
        Self::with_tokenizer(options, Arc::new(TokenizerMode::Whitespace))
    }

    pub fn with_tokenizer(options: NumberAnnotatorOptions, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        let percentage_suffixes = if options.percentage_pieces_string.is_empty() {
            SortedStringsTable::from_pieces(&options.percentage_pieces)
        } else {
            SortedStringsTable::from_serialized(
                options.percentage_pieces_string.as_bytes(),
                &options.percentage_pieces_offsets,
            )?
        };

        Ok(Self {
            allowed_prefix: CodepointSet::from_codepoints(&options.allowed_prefix_codepoints)?,
            allowed_suffix: CodepointSet::from_codepoints(&options.allowed_suffix_codepoints)?,
            stripper: BoundaryStripper::from_options(&options.boundary)?,
            percentage_suffixes,
            tokenizer,
            options,
        })
    }

    pub fn options(&self) -> &NumberAnnotatorOptions {
        &self.options
    }

    /// Todos os números (e porcentagens) do contexto.
    ///
    /// Devolve vazio se o anotador estiver desligado ou o caso de uso não
    /// estiver habilitado na máscara.
    pub fn find_all(&self, context: &str, usecase: AnnotationUsecase) -> Vec<AnnotatedSpan> {
        if !self.options.enabled || !usecase.is_enabled_in(self.options.enabled_annotation_usecases) {
            return Vec::new();
        }

        let mut result = Vec::new();
        for token in self.tokenizer.tokenize(context) {
            let Some(parsed) = self.parse_number(&token.value) else {
                continue;
            };

            let mut classification = ClassificationResult::new(collections::NUMBER, self.options.score)
                .with_priority_score(if parsed.has_decimal {
                    self.options.float_number_priority_score
                } else {
                    self.options.priority_score
                });
            classification.numeric_value = Some(parsed.int_value);
            classification.numeric_double_value = Some(parsed.double_value);

            let span = CodepointSpan::new(
                token.start + parsed.num_prefix_codepoints,
                token.end - parsed.num_suffix_codepoints,
            );
            result.push(AnnotatedSpan::new(span, vec![classification]));
        }

        if self.options.enable_percentage {
            self.find_percentages(&CodepointText::new(context), &mut result);
        }
        result
    }

    /// Classifica a seleção inteira: só aceita um resultado cujo span coincide
    /// com a seleção sem fronteiras (rejeita "23 asdf 3.14").
    pub fn classify_text(
        &self,
        context: &str,
        selection: CodepointSpan,
        usecase: AnnotationUsecase,
    ) -> Option<ClassificationResult> {
        let text = CodepointText::new(context);
        let results = self.find_all(text.substring(selection), usecase);

        let stripped_selection = self.stripper.strip(&text, selection);

        results
            .into_iter()
            .filter(|result| result.span.shift(selection.start) == stripped_selection)
            .find_map(|result| result.classification.into_iter().next())
    }

    /// Interpreta um token como número.
    pub fn parse_number(&self, token: &str) -> Option<ParsedNumber> {
        let text = CodepointText::new(token);
        let full = CodepointSpan::new(0, text.len_codepoints());
        let stripped = self.stripper.strip(&text, full);
        let num_stripped_end = full.end - stripped.end;
        let chars: Vec<char> = text.chars(stripped).collect();

        let num_allowed_prefix = chars
            .iter()
            .take_while(|&&c| self.allowed_prefix.contains(c))
            .count();

        let (consumed, int_value, double_value, has_decimal) =
            consume_and_parse_number(&chars[num_allowed_prefix..])?;

        let mut num_allowed_suffix = 0;
        for &c in &chars[num_allowed_prefix + consumed..] {
            if self.allowed_suffix.contains(c) {
                num_allowed_suffix += 1;
            } else if !self.stripper.suffix().contains(c) {
                // Aceita "13.", "34#", mas não "12abc"
                return None;
            }
        }

        Some(ParsedNumber {
            int_value,
            double_value,
            has_decimal,
            num_prefix_codepoints: stripped.start + num_allowed_prefix,
            num_suffix_codepoints: num_allowed_suffix + num_stripped_end,
        })
    }

    /// Tamanho, em codepoints, do sufixo de porcentagem que começa em `index`.
    fn percent_suffix_length(&self, context: &CodepointText<'_>, index: usize) -> Option<usize> {
        if index >= context.len_codepoints() {
            return None;
        }
        let rest = context.suffix_from(index);
        let match_len = self.percentage_suffixes.longest_prefix_match(rest)?;
        Some(num_codepoints(&rest[..match_len]))
    }

    fn find_percentages(&self, context: &CodepointText<'_>, result: &mut [AnnotatedSpan]) {
        for annotated in result.iter_mut() {
            let Some(first) = annotated.classification.first_mut() else {
                continue;
            };
            if first.collection != collections::NUMBER {
                continue;
            }
            match self.percent_suffix_length(context, annotated.span.end) {
                Some(len) if len > 0 => {
                    first.collection = collections::PERCENTAGE.to_string();
                    first.priority_score = self.options.percentage_priority_score;
                    annotated.span.end += len;
                }
                _ => {}
            }
        }
    }
}

/// Acrescenta um dígito ASCII ao acumulador, ou `None` se houver risco de overflow.
fn push_digit(acc: i64, c: char) -> Option<i64> {
    if acc > i64::MAX / 10 - 10 {
        return None;
    }
    Some(acc * 10 + i64::from(c.to_digit(10)?))
}

/// Lê sinal, parte inteira e parte decimal.
///
/// Devolve `(codepoints consumidos, valor inteiro, valor real, tem_decimal)`.
fn consume_and_parse_number(chars: &[char]) -> Option<(usize, i64, f64, bool)> {
    let mut pos = 0;
    let mut sign = 1i64;
    while let Some(&c) = chars.get(pos) {
        match c {
            '-' => sign = -1,
            '+' => sign = 1,
            _ => break,
        }
        pos += 1;
    }

    let mut state = ParseState::WholePart;
    let mut whole = 0i64;
    let mut fraction = 0i64;
    let mut denominator = 1.0f64;
    let mut has_decimal = false;
    let mut num_digits = 0;

    while let Some(&c) = chars.get(pos) {
        match state {
            ParseState::WholePart if unilib::is_digit(c) => {
                whole = push_digit(whole, c)?;
                num_digits += 1;
            }
            ParseState::WholePart if c == '.' || c == ',' => state = ParseState::FloatingPart,
            ParseState::FloatingPart if unilib::is_digit(c) => match push_digit(fraction, c) {
                Some(value) => {
                    fraction = value;
                    denominator *= 10.0;
                    has_decimal = true;
                    num_digits += 1;
                }
                None => state = ParseState::Done,
            },
            _ => state = ParseState::Done,
        }
        if state == ParseState::Done {
            break;
        }
        pos += 1;
    }

    if num_digits == 0 {
        return None;
    }

    let double_value = sign as f64 * (whole as f64 + fraction as f64 / denominator);
    Some((pos, whole * sign, double_value, has_decimal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codepoints(chars: &str) -> Vec<u32> {
        chars.chars().map(u32::from).collect()
    }

    fn options() -> NumberAnnotatorOptions {
        NumberAnnotatorOptions {
            enable_percentage: true,
            allowed_prefix_codepoints: codepoints("$€£"),
            allowed_suffix_codepoints: codepoints("k"),
            boundary: BoundaryOptions {
                ignored_prefix_span_boundary_codepoints: codepoints("([{\"'"),
                ignored_suffix_span_boundary_codepoints: codepoints(".,!?%)]}\"':;#"),
            },
            percentage_pieces: vec!["%".into(), "pct".into(), " por cento".into()],
            ..Default::default()
        }
    }

    fn annotator() -> NumberAnnotator {
        NumberAnnotator::new(options()).unwrap()
    }

    fn parse(token: &str) -> Option<ParsedNumber> {
        annotator().parse_number(token)
    }

    #[test]
    fn test_integer() {
        let n = parse("123").unwrap();
        assert_eq!(n.int_value, 123);
        assert_eq!(n.double_value, 123.0);
        assert!(!n.has_decimal);
        assert_eq!((n.num_prefix_codepoints, n.num_suffix_codepoints), (0, 0));
    }

    #[test]
    fn test_decimal() {
        let n = parse("3.14").unwrap();
        assert!(n.has_decimal);
        assert_eq!(n.int_value, 3);
        assert!((n.double_value - 3.14).abs() < 1e-9);

        let n = parse("1,5").unwrap();
        assert!((n.double_value - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_sign_last_wins() {
        assert_eq!(parse("-42").unwrap().int_value, -42);
        assert_eq!(parse("+-7").unwrap().int_value, -7);
        assert_eq!(parse("-+7").unwrap().int_value, 7);
        assert!((parse("-3.5").unwrap().double_value + 3.5).abs() < 1e-9);
        assert!(parse("-").is_none());
    }

    #[test]
    fn test_overflow_rejects_token() {
        assert!(parse(&"9".repeat(25)).is_none());
        assert_eq!(parse("922337203685477570").unwrap().int_value, 922337203685477570);
    }

    #[test]
    fn test_fraction_overflow_rejects_token() {
        assert!(parse("0.12345678901234567890").is_none());
        assert!(parse("0.123456789").is_some());
    }

    #[test]
    fn test_trailing_punctuation() {
        let n = parse("13.").unwrap();
        assert_eq!(n.int_value, 13);
        assert_eq!(n.num_suffix_codepoints, 1);
        assert!(!n.has_decimal);

        assert_eq!(parse("34#").unwrap().int_value, 34);
        assert!(parse("12abc").is_none());
        assert!(parse("abc").is_none());
        assert!(parse("...").is_none());
    }

    #[test]
    fn test_prefix_and_suffix_excluded_from_span() {
        let spans = annotator().find_all("custa $5.00 ou 3k.", AnnotationUsecase::Smart);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].span, CodepointSpan::new(7, 11));
        assert_eq!(spans[0].classification[0].numeric_value, Some(5));
        assert_eq!(spans[1].span, CodepointSpan::new(15, 16));
        assert_eq!(spans[1].classification[0].numeric_value, Some(3));
    }

    #[test]
    fn test_find_all_priorities() {
        let spans = annotator().find_all("5 e 2.5", AnnotationUsecase::Smart);
        let first = &spans[0].classification[0];
        assert_eq!(first.collection, collections::NUMBER);
        assert_eq!(first.priority_score, -10.0);
        assert_eq!(first.numeric_double_value, Some(5.0));
        assert_eq!(spans[1].classification[0].priority_score, 1.0);
    }

    #[test]
    fn test_percentage_span_covers_suffix() {
        let spans = annotator().find_all("99%", AnnotationUsecase::Smart);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span, CodepointSpan::new(0, 3));
        let c = &spans[0].classification[0];
        assert_eq!(c.collection, collections::PERCENTAGE);
        assert_eq!(c.priority_score, 1.0);
        assert_eq!(c.numeric_value, Some(99));
    }

    #[test]
    fn test_percentage_multi_codepoint_suffix() {
        let spans = annotator().find_all("subiu 12 por cento", AnnotationUsecase::Smart);
        assert_eq!(spans[0].span, CodepointSpan::new(6, 18));
        assert_eq!(spans[0].classification[0].collection, collections::PERCENTAGE);
    }

    #[test]
    fn test_percentage_disabled() {
        let annotator = NumberAnnotator::new(NumberAnnotatorOptions {
            enable_percentage: false,
            ..options()
        })
        .unwrap();
        let spans = annotator.find_all("99%", AnnotationUsecase::Smart);
        assert_eq!(spans[0].span, CodepointSpan::new(0, 2));
        assert_eq!(spans[0].classification[0].collection, collections::NUMBER);
    }

    #[test]
    fn test_serialized_percentage_table() {
        let annotator = NumberAnnotator::new(NumberAnnotatorOptions {
            percentage_pieces_string: "%\0pct\0".into(),
            percentage_pieces_offsets: vec![0, 2],
            percentage_pieces: Vec::new(),
            ..options()
        })
        .unwrap();
        let spans = annotator.find_all("10pct", AnnotationUsecase::Smart);
        // "pct" não é sufixo permitido: o token inteiro não é número
        assert!(spans.is_empty());
        let spans = annotator.find_all("10%", AnnotationUsecase::Smart);
        assert_eq!(spans[0].classification[0].collection, collections::PERCENTAGE);
    }

    #[test]
    fn test_usecase_mask() {
        let annotator = NumberAnnotator::new(NumberAnnotatorOptions {
            enabled_annotation_usecases: AnnotationUsecase::Raw.bit(),
            ..options()
        })
        .unwrap();
        assert!(annotator.find_all("42", AnnotationUsecase::Smart).is_empty());
        assert_eq!(annotator.find_all("42", AnnotationUsecase::Raw).len(), 1);

        let disabled = NumberAnnotator::new(NumberAnnotatorOptions {
            enabled: false,
            ..options()
        })
        .unwrap();
        assert!(disabled.find_all("42", AnnotationUsecase::Raw).is_empty());
    }

    #[test]
    fn test_classify_text_exact_selection() {
        let annotator = annotator();
        let context = "custa 3.14.";
        let result = annotator
            .classify_text(context, CodepointSpan::new(6, 11), AnnotationUsecase::Smart)
            .unwrap();
        assert_eq!(result.collection, collections::NUMBER);
        assert!((result.numeric_double_value.unwrap() - 3.14).abs() < 1e-9);
    }

    #[test]
    fn test_classify_text_rejects_extra_tokens() {
        let annotator = annotator();
        let context = "23 asdf 3.14 pct asdf";
        let whole = CodepointSpan::new(0, context.chars().count());
        assert!(annotator
            .classify_text(context, whole, AnnotationUsecase::Smart)
            .is_none());
        assert!(annotator
            .classify_text(context, CodepointSpan::new(0, 2), AnnotationUsecase::Smart)
            .is_some());
    }

    #[test]
    fn test_invalid_options() {
        let bad_codepoint = NumberAnnotatorOptions {
            allowed_prefix_codepoints: vec![0xD800],
            ..Default::default()
        };
        assert!(NumberAnnotator::new(bad_codepoint).is_err());

        let unsorted = NumberAnnotatorOptions {
            percentage_pieces_string: "pct\0%\0".into(),
            percentage_pieces_offsets: vec![0, 4],
            ..Default::default()
        };
        assert!(NumberAnnotator::new(unsorted).is_err());
    }

    #[test]
    fn test_options_from_json() {
        let options = NumberAnnotatorOptions::from_json(
            r#"{"enable_percentage": true, "allowed_prefix_codepoints": [36],
                "ignored_suffix_span_boundary_codepoints": [37], "percentage_pieces": ["%"]}"#,
        )
        .unwrap();
        assert!(options.enabled);
        assert_eq!(options.priority_score, -10.0);
        assert_eq!(options.boundary.ignored_suffix_span_boundary_codepoints, vec![37]);
        assert!(options.boundary.ignored_prefix_span_boundary_codepoints.is_empty());
        let spans = NumberAnnotator::new(options)
            .unwrap()
            .find_all("$7%", AnnotationUsecase::Smart);
        assert_eq!(spans[0].span, CodepointSpan::new(1, 3));
    }

    #[test]
    fn test_invalid_boundary_codepoint_rejected() {
        let options = NumberAnnotatorOptions::from_json(r#"{"ignored_prefix_span_boundary_codepoints": [55296]}"#)
            .unwrap();
        assert!(matches!(
            NumberAnnotator::new(options),
            Err(crate::error::Error::InvalidCodepoint(0xD800))
        ));
    }
}
