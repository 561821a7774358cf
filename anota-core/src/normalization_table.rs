//! Tabela fixa de substituições do normalizador.
//!
//! Mapeia um codepoint para sua forma "dobrada": sem diacríticos, ligaduras
//! expandidas, formas de largura total reduzidas. É montada uma única vez no
//! primeiro uso e nunca mais alterada.
//!
//! Entram na tabela:
//! 1. Todo codepoint dos blocos abaixo cuja decomposição NFKD, sem as marcas
//!    combinantes, difere dele mesmo (ex: 'ã' -> "a", 'ﬁ' -> "fi", 'Ａ' -> "A",
//!    U+0301 -> "").
//! 2. Letras sem decomposição Unicode mas com transliteração latina usual
//!    (ex: 'ß' -> "ss", 'ø' -> "o").
//!
//! Toda substituição é composta de caracteres que não estão na tabela.

use std::collections::HashMap;
use std::sync::OnceLock;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Blocos varridos na montagem.
const SCANNED_RANGES: &[(u32, u32)] = &[
    (0x00A0, 0x036F), // Latin-1, Latin Extended-A/B, IPA, marcas combinantes
    (0x0370, 0x03FF), // Grego
    (0x0400, 0x04FF), // Cirílico
    (0x1AB0, 0x1AFF), // Marcas combinantes estendidas
    (0x1DC0, 0x1EFF), // Marcas suplementares, Latin Extended Additional
    (0x1F00, 0x1FFF), // Grego estendido
    (0x2000, 0x218F), // Pontuação geral, sobrescritos, símbolos de letras, números romanos
    (0x2460, 0x24FF), // Alfanuméricos circulados
    (0xFB00, 0xFB4F), // Ligaduras
    (0xFE20, 0xFE2F), // Meias marcas combinantes
    (0xFF00, 0xFFEF), // Formas de largura total
];

/// Transliterações sem decomposição canônica/compatível.
const EXTRA_SUBSTITUTIONS: &[(char, &str)] = &[
    ('ß', "ss"),
    ('ẞ', "SS"),
    ('æ', "ae"),
    ('Æ', "AE"),
    ('œ', "oe"),
    ('Œ', "OE"),
    ('ø', "o"),
    ('Ø', "O"),
    ('đ', "d"),
    ('Đ', "D"),
    ('ð', "d"),
    ('Ð', "D"),
    ('ł', "l"),
    ('Ł', "L"),
    ('þ', "th"),
    ('Þ', "TH"),
    ('ı', "i"),
    ('ħ', "h"),
    ('Ħ', "H"),
    ('ŧ', "t"),
    ('Ŧ', "T"),
    ('ŀ', "l"),
    ('Ŀ', "L"),
];

fn fold(c: char) -> String {
    c.to_string()
        .nfkd()
        .filter(|&d| !is_combining_mark(d))
        .collect()
}

fn build() -> HashMap<char, String> {
    let mut table: HashMap<char, String> = HashMap::new();
    for &(first, last) in SCANNED_RANGES {
        for c in (first..=last).filter_map(char::from_u32) {
            let folded = fold(c);
            if folded.chars().ne(std::iter::once(c)) {
                table.insert(c, folded);
            }
        }
    }
    for &(c, replacement) in EXTRA_SUBSTITUTIONS {
        table.insert(c, replacement.to_string());
    }
    // Substituições cujo resultado ainda cai na tabela são resolvidas até o ponto fixo.
    let pending: Vec<(char, String)> = table
        .iter()
        .filter(|(_, value)| value.chars().any(|d| table.contains_key(&d)))
        .map(|(&c, value)| (c, resolve(&table, value)))
        .collect();
    table.extend(pending);
    table
}

fn resolve(table: &HashMap<char, String>, value: &str) -> String {
    let mut current = value.to_string();
    // NFKD já é totalmente decomposto: poucas rodadas bastam; o limite evita ciclos.
    for _ in 0..4 {
        let next: String = current
            .chars()
            .map(|c| table.get(&c).cloned().unwrap_or_else(|| c.to_string()))
            .collect();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Tabela global, montada no primeiro acesso.
pub fn normalization_table() -> &'static HashMap<char, String> {
    static TABLE: OnceLock<HashMap<char, String>> = OnceLock::new();
    TABLE.get_or_init(build)
}

/// Substituição de `c`, se houver.
pub fn lookup(c: char) -> Option<&'static str> {
    normalization_table().get(&c).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diacritics() {
        assert_eq!(lookup('ã'), Some("a"));
        assert_eq!(lookup('Ç'), Some("C"));
        assert_eq!(lookup('ő'), Some("o"));
        assert_eq!(lookup('ά'), Some("α"));
        assert_eq!(lookup('\u{0301}'), Some(""));
    }

    #[test]
    fn test_ligatures_and_width() {
        assert_eq!(lookup('ﬁ'), Some("fi"));
        assert_eq!(lookup('Ａ'), Some("A"));
        assert_eq!(lookup('ß'), Some("ss"));
        assert_eq!(lookup('Å'), Some("A"));
    }

    #[test]
    fn test_identity_not_in_table() {
        assert_eq!(lookup('a'), None);
        assert_eq!(lookup('7'), None);
        assert_eq!(lookup('中'), None);
    }

    #[test]
    fn test_replacements_are_fixed_points() {
        for replacement in normalization_table().values() {
            for c in replacement.chars() {
                assert!(lookup(c).is_none(), "{c:?} ainda está na tabela");
            }
        }
    }
}
