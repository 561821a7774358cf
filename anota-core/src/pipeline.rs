//! # Pipeline de Anotação — Orquestrador com Eventos Observáveis
//!
//! O pipeline coordena os anotadores (números e dicionários) e emite eventos
//! em cada passo via um canal Rust (`mpsc`), permitindo que o servidor
//! WebSocket transmita o progresso em tempo real para o cliente.
//!
//! Os anotadores são independentes: cada um produz seus spans e o pipeline
//! apenas os junta e ordena. Spans de anotadores diferentes podem se
//! sobrepor; a resolução de conflitos fica a cargo de quem consome.

use std::cmp::Reverse;
use std::sync::{mpsc, Arc};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lookup::LookupEngine;
use crate::number::NumberAnnotator;
use crate::tokenizer::{Token, Tokenizer};
use crate::types::{AnnotatedSpan, AnnotationUsecase, ClassificationResult, CodepointSpan};
use crate::utf8::CodepointText;

/// Janela máxima, em tokens, testada pelos dicionários.
pub const DEFAULT_MAX_NUM_TOKENS: usize = 5;
/// Máximo de resultados por span nos dicionários.
pub const DEFAULT_MAX_NUM_MATCHES: usize = 3;

/// Nome do anotador de números nos eventos.
pub const NUMBER_ANNOTATOR: &str = "number";

/// Eventos emitidos pelo pipeline durante o processamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Tokenização concluída.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 2**: Um anotador encontrou um span.
    SpanAnnotated {
        annotator: String,
        span: CodepointSpan,
        text: String,
        collection: String,
    },
    /// **Conclusão**: Todos os spans, ordenados por início.
    Done {
        spans: Vec<AnnotatedSpan>,
        total_tokens: usize,
        processing_ms: u64,
    },
}

/// O pipeline de anotação.
///
/// Imutável depois de montado: pode ser compartilhado entre threads e
/// consultado concorrentemente.
///
/// # Modos de Uso
/// - **Sync**: [`AnnotationPipeline::analyze`] para chamadas diretas.
/// - **Streaming**: [`AnnotationPipeline::analyze_streaming`] para UIs reativas.
/// - **Lote**: [`AnnotationPipeline::analyze_batch`] processa vários textos em paralelo.
#[derive(Clone)]
pub struct AnnotationPipeline {
    tokenizer: Arc<dyn Tokenizer>,
    number: Option<NumberAnnotator>,
    lookups: Vec<(String, LookupEngine)>,
    max_num_tokens: usize,
    max_num_matches: usize,
}

impl AnnotationPipeline {
    /// Pipeline vazio: só tokeniza.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            number: None,
            lookups: Vec::new(),
            max_num_tokens: DEFAULT_MAX_NUM_TOKENS,
            max_num_matches: DEFAULT_MAX_NUM_MATCHES,
        }
    }

    pub fn with_number_annotator(mut self, annotator: NumberAnnotator) -> Self {
        self.number = Some(annotator);
        self
    }

    /// Adiciona um dicionário; `name` identifica o anotador nos eventos.
    pub fn with_lookup(mut self, name: impl Into<String>, engine: LookupEngine) -> Self {
        self.lookups.push((name.into(), engine));
        self
    }

    /// Janela máxima de tokens e máximo de resultados por span dos dicionários.
    pub fn with_limits(mut self, max_num_tokens: usize, max_num_matches: usize) -> Self {
        self.max_num_tokens = max_num_tokens;
        self.max_num_matches = max_num_matches;
        self
    }

    /// Nomes dos anotadores, na ordem em que rodam.
    pub fn annotator_names(&self) -> Vec<&str> {
        self.number
            .iter()
            .map(|_| NUMBER_ANNOTATOR)
            .chain(self.lookups.iter().map(|(name, _)| name.as_str()))
            .collect()
    }

    /// Processa o texto de forma síncrona e devolve os spans ordenados.
    pub fn analyze(&self, text: &str, usecase: AnnotationUsecase) -> Vec<AnnotatedSpan> {
        let (tx, rx) = mpsc::channel();
        self.analyze_streaming(text, usecase, tx);

        let mut spans = Vec::new();
        while let Ok(event) = rx.recv() {
            if let PipelineEvent::Done { spans: done, .. } = event {
                spans = done;
            }
        }
        spans
    }

    /// Processa vários textos em paralelo (pool do rayon), preservando a ordem.
    pub fn analyze_batch<S>(&self, texts: &[S], usecase: AnnotationUsecase) -> Vec<Vec<AnnotatedSpan>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.analyze(text.as_ref(), usecase))
            .collect()
    }

    /// Executa o pipeline enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `TokenizationDone`
    /// 2. `SpanAnnotated` (um por span, anotador a anotador)
    /// 3. `Done`
    ///
    /// Se o receptor for descartado no meio do caminho, o processamento
    /// continua e os eventos são descartados.
    pub fn analyze_streaming(&self, text: &str, usecase: AnnotationUsecase, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let context = CodepointText::new(text);

        // === Passo 1: Tokenização ===
        let tokens = self.tokenizer.tokenize(text);
        let total_tokens = tokens.len();
        debug!(total_tokens, "tokenização concluída");
        let _ = tx.send(PipelineEvent::TokenizationDone {
            tokens: tokens.clone(),
            total: total_tokens,
        });

        // === Passo 2: Anotadores ===
        let mut spans = Vec::new();
        let mut emit = |annotator: &str, found: Vec<AnnotatedSpan>| {
            debug!(annotator, spans = found.len(), "anotador concluído");
            for annotated in found {
                let _ = tx.send(PipelineEvent::SpanAnnotated {
                    annotator: annotator.to_string(),
                    span: annotated.span,
                    text: context.substring(annotated.span).to_string(),
                    collection: annotated.best().map(|c| c.collection.clone()).unwrap_or_default(),
                });
                spans.push(annotated);
            }
        };

        if let Some(number) = &self.number {
            emit(NUMBER_ANNOTATOR, number.find_all(text, usecase));
        }
        for (name, engine) in &self.lookups {
            emit(name.as_str(), engine.chunk(text, &tokens, self.max_num_tokens, self.max_num_matches));
        }

        // === Conclusão ===
        spans.sort_by_key(|s| (s.span.start, Reverse(s.span.end)));
        let _ = tx.send(PipelineEvent::Done {
            spans,
            total_tokens,
            processing_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
    }

    /// Classifica uma seleção: primeiro como número, depois em cada dicionário.
    pub fn classify(
        &self,
        text: &str,
        selection: CodepointSpan,
        usecase: AnnotationUsecase,
    ) -> Option<ClassificationResult> {
        self.number
            .as_ref()
            .and_then(|number| number.classify_text(text, selection, usecase))
            .or_else(|| {
                self.lookups
                    .iter()
                    .find_map(|(_, engine)| engine.classify_text(text, selection))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_pipeline;
    use crate::types::collections;

    const TEXT: &str = "Em 2010 o Nubank tinha 15% do mercado de São Paulo.";

    #[test]
    fn test_pipeline_basic() {
        let pipeline = demo_pipeline().unwrap();
        let spans = pipeline.analyze(TEXT, AnnotationUsecase::Smart);

        let summary: Vec<(usize, usize, &str)> = spans
            .iter()
            .map(|s| (s.span.start, s.span.end, s.classification[0].collection.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (3, 7, collections::NUMBER),
                (10, 16, "organization"),
                (23, 26, collections::PERCENTAGE),
                (41, 50, "location"),
            ]
        );
    }

    #[test]
    fn test_pipeline_empty() {
        let pipeline = demo_pipeline().unwrap();
        assert!(pipeline.analyze("", AnnotationUsecase::Smart).is_empty());
    }

    #[test]
    fn test_pipeline_events_streaming() {
        let pipeline = demo_pipeline().unwrap();
        let (tx, rx) = mpsc::channel();
        pipeline.analyze_streaming(TEXT, AnnotationUsecase::Smart, tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(
            matches!(&events[0], PipelineEvent::TokenizationDone { total: 11, .. }),
            "Primeiro evento deve ser TokenizationDone"
        );
        assert!(
            matches!(events.last(), Some(PipelineEvent::Done { spans, .. }) if spans.len() == 4),
            "Último evento deve ser Done"
        );

        let annotated: Vec<(&str, &str)> = events
            .iter()
            .filter_map(|e| match e {
                PipelineEvent::SpanAnnotated { annotator, text, .. } => Some((annotator.as_str(), text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            annotated,
            vec![
                ("number", "2010"),
                ("number", "15%"),
                ("locais", "São Paulo"),
                ("organizacoes", "Nubank"),
            ]
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = PipelineEvent::SpanAnnotated {
            annotator: "number".into(),
            span: CodepointSpan::new(0, 2),
            text: "42".into(),
            collection: collections::NUMBER.into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SpanAnnotated");
        assert_eq!(json["data"]["span"]["end"], 2);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let pipeline = demo_pipeline().unwrap();
        let texts = vec![TEXT, "", "Paris, 3 dias", "nada aqui"];
        let batch = pipeline.analyze_batch(&texts, AnnotationUsecase::Smart);
        assert_eq!(batch.len(), texts.len());
        for (text, spans) in texts.iter().zip(&batch) {
            assert_eq!(spans, &pipeline.analyze(text, AnnotationUsecase::Smart));
        }
    }

    #[test]
    fn test_spans_sorted_longer_first() {
        let pipeline = demo_pipeline().unwrap();
        // "Banco do Brasil" (organização) contém "Brasil" (local)
        let spans = pipeline.analyze("conta no Banco do Brasil", AnnotationUsecase::Smart);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].span, CodepointSpan::new(9, 24));
        assert_eq!(spans[1].span, CodepointSpan::new(18, 24));
    }

    #[test]
    fn test_classify_number_then_lookup() {
        let pipeline = demo_pipeline().unwrap();
        let number = pipeline
            .classify(TEXT, CodepointSpan::new(3, 7), AnnotationUsecase::Smart)
            .unwrap();
        assert_eq!(number.numeric_value, Some(2010));

        let percentage = pipeline
            .classify("subiu 12 por cento", CodepointSpan::new(6, 18), AnnotationUsecase::Smart)
            .unwrap();
        assert_eq!(percentage.collection, collections::PERCENTAGE);

        let place = pipeline
            .classify(TEXT, CodepointSpan::new(41, 51), AnnotationUsecase::Smart)
            .unwrap();
        assert_eq!(place.collection, "location");

        assert!(pipeline
            .classify(TEXT, CodepointSpan::new(0, 7), AnnotationUsecase::Smart)
            .is_none());
    }

    #[test]
    fn test_limits_bound_window_and_matches() {
        let text = "Paris e São Paulo";
        let pipeline = demo_pipeline().unwrap();
        let spans = pipeline.analyze(text, AnnotationUsecase::Smart);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].span, CodepointSpan::new(0, 5));
        assert_eq!(spans[0].classification.len(), 2);
        assert_eq!(spans[1].span, CodepointSpan::new(8, 17));

        // Janela de um token: "São Paulo" não casa; Paris fica com um resultado
        let narrow = pipeline.with_limits(1, 1);
        let spans = narrow.analyze(text, AnnotationUsecase::Smart);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span, CodepointSpan::new(0, 5));
        assert_eq!(spans[0].classification.len(), 1);
    }

    #[test]
    fn test_annotator_names() {
        let pipeline = demo_pipeline().unwrap();
        assert_eq!(pipeline.annotator_names(), vec!["number", "locais", "organizacoes"]);
    }
}
