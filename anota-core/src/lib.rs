//! # anota-core — Anotadores de Texto por Dicionário e Números
//!
//! Este crate implementa dois anotadores independentes que marcam trechos de
//! texto (spans) com uma coleção:
//!
//! - **Dicionário** ([`lookup`]): encontra n-gramas de um gazetteer no texto,
//!   comparando formas normalizadas ("SÃO PAULO" casa com "São Paulo").
//! - **Números** ([`number`]): encontra literais numéricos ("123", "3,14",
//!   "$5.00") e os promove a porcentagem quando seguidos de um sufixo ("99%").
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Tokenização** ([`tokenizer`]): O texto é dividido em tokens com offsets em codepoints.
//! 3.  **Anotação**: cada anotador produz uma lista de [`AnnotatedSpan`].
//!     *   [`normalizer`] canoniza os n-gramas antes da busca.
//!     *   [`boundary`] remove pontuação das bordas dos spans.
//!     *   [`sorted_strings`] guarda os sufixos de porcentagem.
//! 4.  **Saída**: spans ordenados, sem resolução de conflitos entre anotadores.
//!
//! Todos os offsets são índices de **codepoint** (não bytes); [`utf8`] faz a
//! conversão.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use anota_core::{AnnotationUsecase, BoundaryStripper, LookupEngine, NumberAnnotator, NumberAnnotatorOptions};
//! use anota_core::tokenizer::tokenize;
//!
//! // 1. Monta o dicionário e congela
//! let mut builder = LookupEngine::builder("location", BoundaryStripper::symmetric(".,"));
//! builder.add_entry(["São Paulo"], Default::default());
//! let engine = builder.build();
//!
//! // 2. Busca no texto tokenizado
//! let text = "Moro em sao paulo.";
//! let spans = engine.chunk(text, &tokenize(text), 3, 1);
//! assert_eq!((spans[0].span.start, spans[0].span.end), (8, 17));
//!
//! // 3. Números
//! let numbers = NumberAnnotator::new(NumberAnnotatorOptions::default()).unwrap();
//! let found = numbers.find_all("custa 42 reais", AnnotationUsecase::Smart);
//! assert_eq!(found[0].classification[0].numeric_value, Some(42));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta tokenização e anotadores, com eventos.
//! - [`lookup`]: Motor de busca por n-gramas.
//! - [`number`]: Anotador de números e porcentagens.
//! - [`demo`]: Textos e dicionários de demonstração.

pub mod boundary;
pub mod demo;
pub mod error;
pub mod lookup;
pub mod normalization_table;
pub mod normalizer;
pub mod number;
pub mod pipeline;
pub mod sorted_strings;
pub mod tokenizer;
pub mod types;
pub mod unilib;
pub mod utf8;

pub use boundary::{BoundaryStripper, CodepointSet};
pub use error::{Error, Result};
pub use lookup::{chunk_with, LookupEngine, LookupEngineBuilder, MatchFinder};
pub use normalizer::Normalizer;
pub use number::{NumberAnnotator, NumberAnnotatorOptions};
pub use pipeline::{AnnotationPipeline, PipelineEvent};
pub use tokenizer::{Token, Tokenizer, TokenizerMode};
pub use types::{collections, AnnotatedSpan, AnnotationUsecase, ClassificationResult, CodepointSpan};
pub use utf8::CodepointText;
