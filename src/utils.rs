//! Parseurs de nombres, normalisation des libellés et formatage monétaire.

use crate::error::CafError;
use crate::types::Money;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

static ANNEE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:19|20)\d{2}").expect("valid year regex"));

/// Remplace une lettre accentuée par sa lettre de base.
const fn fold_accent(ch: char) -> char {
    match ch {
        'à' | 'â' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' => 'i',
        'ô' | 'ö' => 'o',
        'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        '\u{2019}' => '\'',
        _ => ch,
    }
}

/// Normalise un libellé : minuscules, accents pliés, espaces regroupées.
#[must_use]
pub fn normalize_label(input: &str) -> String {
    let mut output = String::new();
    let mut prev_space = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        let ch = fold_accent(ch);
        let is_space = ch.is_whitespace();
        if is_space {
            if !prev_space {
                output.push(' ');
            }
        } else {
            output.push(ch);
        }
        prev_space = is_space;
    }
    output.trim().to_string()
}

/// Normalise une chaîne numérique : espaces, signe plus, virgule décimale.
fn normalize_number(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|ch| !matches!(*ch, ' ' | '\u{a0}' | '\u{202f}' | '+'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.contains(',') {
        // Écriture française « 1.234,56 » : le point est un séparateur de milliers.
        cleaned
            .chars()
            .filter(|ch| *ch != '.')
            .map(|ch| if ch == ',' { '.' } else { ch })
            .collect()
    } else {
        cleaned.to_string()
    }
}

/// Lit un montant, en traitant la cellule vide comme un zéro.
pub fn parse_money_or_zero(value: &str, column: &'static str) -> Result<Money, CafError> {
    let normalized = normalize_number(value);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&normalized).map_err(|_| CafError::Number {
        value: value.trim().to_string(),
        column,
    })
}

/// Formate un montant à la française : « 1 234,56 DZD ».
#[must_use]
pub fn format_montant(value: Money, devise: &str) -> String {
    let rounded = value.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::new();
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped},{frac_part} {devise}")
}

/// Cherche la colonne dont l'en-tête normalisé contient un des candidats.
pub(crate) fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let normalized = normalize_label(header);
        candidates.iter().any(|c| normalized.contains(c))
    })
}

/// Extrait un millésime d'exercice du nom de la source, s'il y en a un.
#[must_use]
pub fn year_from_source(source: &str) -> Option<i32> {
    ANNEE_RE
        .find_iter(source)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_les_libelles_accentues() {
        assert_eq!(
            normalize_label("  Dotations aux AMORTISSEMENTS,  provisions "),
            "dotations aux amortissements, provisions"
        );
        assert_eq!(normalize_label("Libellé"), "libelle");
        assert_eq!(normalize_label("N° de compte"), "n° de compte");
    }

    #[test]
    fn lit_les_nombres_francais() {
        assert_eq!(
            parse_money_or_zero("1 234,56", "montant").unwrap(),
            Decimal::from_str("1234.56").unwrap()
        );
        assert_eq!(
            parse_money_or_zero("1.234,56", "montant").unwrap(),
            Decimal::from_str("1234.56").unwrap()
        );
        assert_eq!(
            parse_money_or_zero("-250", "montant").unwrap(),
            Decimal::from_str("-250").unwrap()
        );
        assert_eq!(parse_money_or_zero("", "montant").unwrap(), Decimal::ZERO);
        assert!(parse_money_or_zero("abc", "montant").is_err());
    }

    #[test]
    fn formate_les_montants() {
        let value = Decimal::from_str("1234567.5").unwrap();
        assert_eq!(format_montant(value, "DZD"), "1 234 567,50 DZD");
        let negatif = Decimal::from_str("-42").unwrap();
        assert_eq!(format_montant(negatif, "DZD"), "-42,00 DZD");
    }

    #[test]
    fn extrait_le_millesime() {
        assert_eq!(year_from_source("balance_2023"), Some(2023));
        assert_eq!(year_from_source("tcr-2021-2022"), Some(2022));
        assert_eq!(year_from_source("balance"), None);
    }
}
