//! Erros de construção do motor.
//!
//! A varredura de texto nunca falha: número inválido, n-grama sem match ou
//! UTF-8 truncado são resultados normais. Só a montagem a partir de
//! configuração devolve [`Result`].

use thiserror::Error;

/// Resultado das operações de construção.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Valor inteiro que não é um escalar Unicode válido.
    #[error("codepoint inválido na configuração: {0:#x}")]
    InvalidCodepoint(u32),

    /// Configuração inconsistente (offsets fora do blob, peças fora de ordem...).
    #[error("configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("erro ao ler JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}
