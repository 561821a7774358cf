//! # Motor de Busca por N-gramas (Gazetteer)
//!
//! Anota termos de dicionário no texto procurando n-gramas normalizados em um
//! índice em memória.
//!
//! ## Ciclo de vida
//!
//! 1. **Construção**: [`LookupEngineBuilder::add_entry`] registra uma entrada
//!    (um [`ClassificationResult`]) sob uma lista de n-gramas.
//! 2. **Consulta**: [`LookupEngineBuilder::build`] congela o dicionário em um
//!    [`LookupEngine`] imutável, que pode ser compartilhado entre threads.
//!
//! ## Chunking guloso
//!
//! Para cada token inicial, em ordem, testamos as janelas da **mais longa para
//! a mais curta**. A primeira janela com match vira um span e "consome" todos
//! os seus tokens:
//!
//! ```text
//! tokens:  I  live  in  new  york  city
//! início "new": [new york city] ✓  -> consome 3 tokens
//!               [new york]         (nem é testado)
//! ```
//!
//! Os spans devolvidos nunca se sobrepõem.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::boundary::BoundaryStripper;
use crate::error::Result;
use crate::normalizer::Normalizer;
use crate::tokenizer::Token;
use crate::types::{AnnotatedSpan, ClassificationResult, CodepointSpan};
use crate::utf8::CodepointText;

/// Estratégia de busca de matches usada pelo chunker.
///
/// Permite trocar a forma de procurar (ex: lista de contatos, busca
/// aproximada) sem mexer no algoritmo de chunking.
pub trait MatchFinder {
    /// Procura até `max_num_matches` resultados para o trecho `span` de `text`.
    ///
    /// Devolve os resultados e o span efetivamente usado (após remover
    /// codepoints de fronteira).
    fn find_matches(
        &self,
        text: &CodepointText<'_>,
        span: CodepointSpan,
        max_num_matches: usize,
    ) -> (Vec<ClassificationResult>, CodepointSpan);
}

/// Chunking guloso, sem sobreposição, preferindo o match mais longo.
pub fn chunk_with<F: MatchFinder + ?Sized>(
    finder: &F,
    text: &CodepointText<'_>,
    tokens: &[Token],
    max_num_tokens: usize,
    max_num_matches: usize,
) -> Vec<AnnotatedSpan> {
    let mut result = Vec::new();
    let mut minimum_start = 0;

    for start in 0..tokens.len() {
        // Sobreposição com o match anterior
        if start < minimum_start {
            continue;
        }

        let last_end = (start + max_num_tokens).min(tokens.len());
        for end in (start + 1..=last_end).rev() {
            let candidate = CodepointSpan::new(tokens[start].start, tokens[end - 1].end);
            let (matches, stripped) = finder.find_matches(text, candidate, max_num_matches);
            if !matches.is_empty() {
                result.push(AnnotatedSpan::new(stripped, matches));
                minimum_start = end;
                break;
            }
        }
    }
    result
}

/// Uma entrada de dicionário no formato de arquivo JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryEntry {
    pub ngrams: Vec<String>,
    pub entry: ClassificationResult,
}

/// Fase de construção do dicionário.
#[derive(Debug, Clone)]
pub struct LookupEngineBuilder {
    collection: String,
    stripper: BoundaryStripper,
    normalizer: Normalizer,
    entries: Vec<ClassificationResult>,
    ngram_to_entry_index: HashMap<String, Vec<usize>>,
}

impl LookupEngineBuilder {
    /// `collection` é gravada em todos os resultados devolvidos pelo motor.
    pub fn new(collection: impl Into<String>, stripper: BoundaryStripper) -> Self {
        Self {
            collection: collection.into(),
            stripper,
            normalizer: Normalizer::new(),
            entries: Vec::new(),
            ngram_to_entry_index: HashMap::new(),
        }
    }

    /// Carrega entradas de um JSON `[{"ngrams": [...], "entry": {...}}, ...]`.
    pub fn from_json(
        collection: impl Into<String>,
        stripper: BoundaryStripper,
        json: &str,
    ) -> Result<Self> {
        let entries: Vec<DictionaryEntry> = serde_json::from_str(json)?;
        let mut builder = Self::new(collection, stripper);
        for DictionaryEntry { ngrams, entry } in entries {
            builder.add_entry(&ngrams, entry);
        }
        Ok(builder)
    }

    /// Registra `entry` sob os n-gramas dados.
    ///
    /// N-gramas vazios (antes ou depois da normalização) são ignorados;
    /// n-gramas com UTF-8 inválido são registrados em log e ignorados.
    /// O índice só é deduplicado contra o último elemento da lista.
    pub fn add_entry<I, S>(&mut self, ngrams: I, entry: ClassificationResult)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let entry_index = self.entries.len();
        self.entries.push(entry);

        for ngram in ngrams {
            let bytes = ngram.as_ref();
            if bytes.is_empty() {
                continue;
            }
            let Ok(ngram) = std::str::from_utf8(bytes) else {
                warn!(ngram = %String::from_utf8_lossy(bytes), "n-grama com UTF-8 inválido ignorado");
                continue;
            };

            let text = CodepointText::new(ngram);
            let full = CodepointSpan::new(0, text.len_codepoints());
            let key = strip_and_normalize(&self.stripper, &self.normalizer, &text, full).0;
            if key.is_empty() {
                continue;
            }
            let entry_indices = self.ngram_to_entry_index.entry(key).or_default();
            if entry_indices.last() != Some(&entry_index) {
                entry_indices.push(entry_index);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Congela o dicionário.
    pub fn build(self) -> LookupEngine {
        debug!(
            collection = %self.collection,
            entries = self.entries.len(),
            ngrams = self.ngram_to_entry_index.len(),
            "dicionário congelado"
        );
        LookupEngine {
            collection: self.collection,
            stripper: self.stripper,
            normalizer: self.normalizer,
            entries: self.entries,
            ngram_to_entry_index: self.ngram_to_entry_index,
        }
    }
}

/// Dicionário congelado, somente leitura.
#[derive(Debug, Clone)]
pub struct LookupEngine {
    collection: String,
    stripper: BoundaryStripper,
    normalizer: Normalizer,
    entries: Vec<ClassificationResult>,
    ngram_to_entry_index: HashMap<String, Vec<usize>>,
}

impl LookupEngine {
    pub fn builder(collection: impl Into<String>, stripper: BoundaryStripper) -> LookupEngineBuilder {
        LookupEngineBuilder::new(collection, stripper)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Entradas na ordem de inserção.
    pub fn entries(&self) -> &[ClassificationResult] {
        &self.entries
    }

    /// Lista de índices de entrada de um n-grama já normalizado.
    pub fn posting_list(&self, normalized_ngram: &str) -> Option<&[usize]> {
        self.ngram_to_entry_index
            .get(normalized_ngram)
            .map(Vec::as_slice)
    }

    /// Spans de n-gramas do dicionário encontrados no texto tokenizado.
    pub fn chunk(
        &self,
        text: &str,
        tokens: &[Token],
        max_num_tokens: usize,
        max_num_matches: usize,
    ) -> Vec<AnnotatedSpan> {
        let text = CodepointText::new(text);
        chunk_with(self, &text, tokens, max_num_tokens, max_num_matches)
    }

    /// Classifica uma seleção inteira: só há resultado se o trecho selecionado
    /// (sem fronteiras) for exatamente um n-grama do dicionário.
    pub fn classify_text(&self, context: &str, selection: CodepointSpan) -> Option<ClassificationResult> {
        let text = CodepointText::new(context);
        let (matches, _) = self.find_matches(&text, selection, 1);
        matches.into_iter().next()
    }

    fn find_token_matches(
        &self,
        key: &str,
        max_num_matches: usize,
        seen: &mut HashSet<usize>,
        results: &mut Vec<ClassificationResult>,
    ) {
        let Some(entry_indices) = self.ngram_to_entry_index.get(key) else {
            return;
        };
        for &entry_index in entry_indices {
            if results.len() >= max_num_matches {
                break;
            }
            if !seen.insert(entry_index) {
                continue;
            }
            let mut result = self.entries[entry_index].clone();
            result.collection = self.collection.clone();
            results.push(result);
        }
    }
}

impl MatchFinder for LookupEngine {
    fn find_matches(
        &self,
        text: &CodepointText<'_>,
        span: CodepointSpan,
        max_num_matches: usize,
    ) -> (Vec<ClassificationResult>, CodepointSpan) {
        let (key, stripped) = strip_and_normalize(&self.stripper, &self.normalizer, text, span);
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        if !key.is_empty() {
            self.find_token_matches(&key, max_num_matches, &mut seen, &mut results);
        }
        (results, stripped)
    }
}

/// Remove fronteiras e normaliza (com minúsculas) o trecho; devolve a chave e o span final.
fn strip_and_normalize(
    stripper: &BoundaryStripper,
    normalizer: &Normalizer,
    text: &CodepointText<'_>,
    span: CodepointSpan,
) -> (String, CodepointSpan) {
    let stripped = stripper.strip(text, span);
    if stripped.is_empty() {
        return (String::new(), stripped);
    }
    (normalizer.normalize(text.substring(stripped), true), stripped)
}
