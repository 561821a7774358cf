//! # Tipos Compartilhados pelos Anotadores
//!
//! Todos os anotadores falam a mesma língua: recebem texto, devolvem
//! [`AnnotatedSpan`]s cujos intervalos são medidos em **codepoints** do texto
//! original (nunca em bytes, nunca no texto normalizado).
//!
//! ## Coleções
//!
//! | Coleção      | Produzida por                     | Exemplo        |
//! |--------------|-----------------------------------|----------------|
//! | `Number`     | [`crate::number::NumberAnnotator`] | "3,14", "-12"  |
//! | `Percentage` | [`crate::number::NumberAnnotator`] | "99%"          |
//! | (livre)      | [`crate::lookup::LookupEngine`]    | "são paulo"    |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Nomes das coleções produzidas pelo anotador numérico.
pub mod collections {
    pub const NUMBER: &str = "Number";
    pub const PERCENTAGE: &str = "Percentage";
}

/// Intervalo semiaberto `[start, end)` de índices de codepoint.
///
/// # Exemplo
/// Em "I live in new york", o span de "new york" é `CodepointSpan { start: 10, end: 18 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CodepointSpan {
    /// Primeiro codepoint (inclusivo)
    pub start: usize,
    /// Fim (exclusivo)
    pub end: usize,
}

impl CodepointSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, other: &CodepointSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Dois spans se sobrepõem se compartilham ao menos um codepoint.
    pub fn overlaps(&self, other: &CodepointSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Desloca o span (ex: de coordenadas de uma substring para o contexto).
    pub fn shift(&self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }
}

impl From<(usize, usize)> for CodepointSpan {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// Casos de uso de anotação. Cada anotador pode ser habilitado por caso de uso
/// através de uma máscara de bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationUsecase {
    /// Seleção inteligente: precisão acima de cobertura.
    #[default]
    Smart = 0,
    /// Anotação crua: tudo o que for encontrado.
    Raw = 1,
}

impl AnnotationUsecase {
    /// Bit correspondente na máscara `enabled_annotation_usecases`.
    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub fn is_enabled_in(self, mask: u32) -> bool {
        mask & self.bit() != 0
    }
}

/// Resultado de classificação de um span.
///
/// `collection` identifica quem produziu o resultado; os campos numéricos só
/// são preenchidos pelo anotador de números; `entity_data` carrega o payload
/// específico de cada entrada de dicionário.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationResult {
    pub collection: String,
    pub score: f32,
    /// Prioridade usada pela camada externa que resolve conflitos entre spans.
    pub priority_score: f32,
    pub numeric_value: Option<i64>,
    pub numeric_double_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_data: Option<serde_json::Value>,
}

impl ClassificationResult {
    pub fn new(collection: impl Into<String>, score: f32) -> Self {
        Self {
            collection: collection.into(),
            score,
            ..Default::default()
        }
    }

    pub fn with_priority_score(mut self, priority_score: f32) -> Self {
        self.priority_score = priority_score;
        self
    }

    pub fn with_entity_data(mut self, data: serde_json::Value) -> Self {
        self.entity_data = Some(data);
        self
    }
}

const FLOAT_TOLERANCE: f64 = 0.001;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < FLOAT_TOLERANCE
}

/// Igualdade tolerante: scores e valores fracionários comparados com
/// tolerância de 0.001.
impl PartialEq for ClassificationResult {
    fn eq(&self, other: &Self) -> bool {
        let doubles_eq = match (self.numeric_double_value, other.numeric_double_value) {
            (Some(a), Some(b)) => approx_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        self.collection == other.collection
            && self.numeric_value == other.numeric_value
            && doubles_eq
            && self.entity_data == other.entity_data
            && approx_eq(self.score as f64, other.score as f64)
            && approx_eq(self.priority_score as f64, other.priority_score as f64)
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClassificationResult({}, score={}, priority_score={})",
            self.collection, self.score, self.priority_score
        )
    }
}

/// Um span anotado com a lista ordenada de classificações.
///
/// A ordem da lista é a ordem de inserção/prioridade, não de score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSpan {
    pub span: CodepointSpan,
    pub classification: Vec<ClassificationResult>,
}

impl AnnotatedSpan {
    pub fn new(span: CodepointSpan, classification: Vec<ClassificationResult>) -> Self {
        Self { span, classification }
    }

    /// Primeira classificação (a de maior prioridade na ordem do anotador).
    pub fn best(&self) -> Option<&ClassificationResult> {
        self.classification.first()
    }
}

impl fmt::Display for AnnotatedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (collection, score) = self
            .best()
            .map(|c| (c.collection.as_str(), c.score))
            .unwrap_or(("", -1.0));
        write!(
            f,
            "Span({}, {}, {}, {})",
            self.span.start, self.span.end, collection, score
        )
    }
}
