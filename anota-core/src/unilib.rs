//! Propriedades Unicode por codepoint.
//!
//! Camada fina sobre os métodos de `char` da biblioteca padrão, com as
//! semânticas que o motor espera (ex: dígito é apenas ASCII).

/// Pares de colchetes reconhecidos (abertura, fechamento).
const BRACKET_PAIRS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('<', '>'),
    ('«', '»'),
    ('‹', '›'),
    ('“', '”'),
    ('‘', '’'),
    ('（', '）'),
    ('［', '］'),
    ('｛', '｝'),
    ('「', '」'),
    ('『', '』'),
    ('【', '】'),
];

/// Minúscula simples: primeiro codepoint do mapeamento completo.
///
/// O único caractere cujo mapeamento tem mais de um codepoint é 'İ'
/// (i + ponto combinante); aqui ele vira 'i'.
pub fn to_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Dígito ASCII. O parser numérico só entende `0-9`.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// Pontuação ASCII, bloco de pontuação geral (U+2000–U+206F) e colchetes.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || ('\u{2010}'..='\u{2027}').contains(&c)
        || ('\u{2030}'..='\u{205E}').contains(&c)
        || matches!(c, '¡' | '¿' | '«' | '»' | '·')
        || is_opening_bracket(c)
        || is_closing_bracket(c)
}

pub fn is_opening_bracket(c: char) -> bool {
    BRACKET_PAIRS.iter().any(|&(open, _)| open == c)
}

pub fn is_closing_bracket(c: char) -> bool {
    BRACKET_PAIRS.iter().any(|&(_, close)| close == c)
}

/// Colchete par; devolve o próprio caractere se não for colchete.
pub fn paired_bracket(c: char) -> char {
    BRACKET_PAIRS
        .iter()
        .find_map(|&(open, close)| {
            if open == c {
                Some(close)
            } else if close == c {
                Some(open)
            } else {
                None
            }
        })
        .unwrap_or(c)
}
