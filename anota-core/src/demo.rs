//! Dados de demonstração: textos, dicionários e configuração de números.
//!
//! Usados pelo servidor web e pelos testes do pipeline.

use std::sync::Arc;

use crate::boundary::{BoundaryOptions, BoundaryStripper};
use crate::error::Result;
use crate::lookup::{LookupEngine, LookupEngineBuilder};
use crate::number::{NumberAnnotator, NumberAnnotatorOptions};
use crate::pipeline::AnnotationPipeline;
use crate::tokenizer::TokenizerMode;

const LOCAIS_JSON: &str = include_str!("../data/locais.json");
const ORGANIZACOES_JSON: &str = include_str!("../data/organizacoes.json");

/// Pontuação ignorada nas bordas dos termos de dicionário.
const LOOKUP_BOUNDARY: &str = ".,;:!?()[]{}\"'«»";

fn codepoints(chars: &str) -> Vec<u32> {
    chars.chars().map(u32::from).collect()
}

/// Textos de demonstração por domínio.
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Economia",
            "O Banco do Brasil anunciou lucro de R$ 9,5 bilhões no trimestre, alta de 12% sobre o ano anterior. Na Bovespa, as ações da Petrobras subiram 2,5 por cento, enquanto o Nubank, com sede em São Paulo, chegou a 100 milhões de clientes.",
        ),
        (
            "Saúde",
            "O Instituto Butantan e a Fiocruz entregaram 4.500.000 doses em março. A Anvisa aprovou o novo protocolo, que reduziu internações em 37% no Rio de Janeiro e em Belo Horizonte.",
        ),
        (
            "História",
            "Em 7 de setembro de 1822, Dom Pedro I proclamou a Independência do Brasil às margens do Rio Ipiranga. Em 13 de maio de 1888 foi assinada a Lei Áurea, e em 1960 a capital mudou para Brasília.",
        ),
        (
            "Viagem",
            "Voo de Lisboa para Paris por €89,90, com escala de 2 horas. Depois, 3 dias em New York City: o hotel custa $250 por noite e a taxa de serviço é de 10pct.",
        ),
        (
            "Fronteiras",
            "Pontuação nas bordas não atrapalha: (SAO PAULO), \"Porto Alegre\", -15,5 graus, +3 pontos, 13. e 99%! Mas 12abc, 1.2.3 e 99999999999999999999999 não são números.",
        ),
    ]
}

/// Configuração de números usada na demonstração.
pub fn demo_number_options() -> NumberAnnotatorOptions {
    NumberAnnotatorOptions {
        enable_percentage: true,
        allowed_prefix_codepoints: codepoints("$€£¥"),
        allowed_suffix_codepoints: Vec::new(),
        boundary: BoundaryOptions {
            ignored_prefix_span_boundary_codepoints: codepoints("([{\"'«"),
            ignored_suffix_span_boundary_codepoints: codepoints(".,;:!?%)]}\"'»"),
        },
        percentage_pieces: ["%", " %", "pct", " pct", " por cento", " porcento"]
            .into_iter()
            .map(String::from)
            .collect(),
        ..Default::default()
    }
}

/// Dicionário de locais.
pub fn demo_locations() -> Result<LookupEngine> {
    Ok(LookupEngineBuilder::from_json("location", BoundaryStripper::symmetric(LOOKUP_BOUNDARY), LOCAIS_JSON)?.build())
}

/// Dicionário de organizações.
pub fn demo_organizations() -> Result<LookupEngine> {
    Ok(
        LookupEngineBuilder::from_json("organization", BoundaryStripper::symmetric(LOOKUP_BOUNDARY), ORGANIZACOES_JSON)?
            .build(),
    )
}

/// Pipeline completo da demonstração: números, locais e organizações.
pub fn demo_pipeline() -> Result<AnnotationPipeline> {
    Ok(AnnotationPipeline::new(Arc::new(TokenizerMode::Whitespace))
        .with_number_annotator(NumberAnnotator::new(demo_number_options())?)
        .with_lookup("locais", demo_locations()?)
        .with_lookup("organizacoes", demo_organizations()?))
}
