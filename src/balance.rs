//! Lecture des balances comptables depuis CSV et classeurs tableur.

use crate::error::CafError;
use crate::types::{BalanceKind, BalanceMetadata, LineItem, Money};
use crate::utils::{find_column, normalize_label, parse_money_or_zero, year_from_source};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::Local;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::io::Read;
use std::path::Path;

/// Devise par défaut des balances importées.
pub const DEVISE_DEFAUT: &str = "DZD";

/// En-têtes reconnus pour la colonne des libellés.
const LABEL_HEADERS: &[&str] = &["libelle", "element", "intitule", "designation"];
/// En-têtes reconnus pour la colonne des montants.
const AMOUNT_HEADERS: &[&str] = &["montant", "solde", "valeur"];
/// En-têtes reconnus pour la colonne des numéros de compte.
const ACCOUNT_HEADERS: &[&str] = &["compte", "code"];

/// Nombre de lignes inspectées pour trouver l'en-tête d'un classeur.
const HEADER_SCAN_ROWS: usize = 10;

/// Balance importée : métadonnées et lignes.
#[derive(Debug, Clone)]
pub struct Balance {
    /// Métadonnées de la source.
    pub meta: BalanceMetadata,
    /// Lignes de la balance, dans l'ordre du fichier.
    pub items: Vec<LineItem>,
}

impl Balance {
    /// Construit une balance en mémoire, sans fichier source.
    #[must_use]
    pub fn from_items(items: Vec<LineItem>, source: &str) -> Self {
        Self {
            meta: metadata(source, BalanceKind::Memoire),
            items,
        }
    }

    /// Remplace la devise des métadonnées.
    #[must_use]
    pub fn with_devise(mut self, devise: impl Into<String>) -> Self {
        self.meta.devise = devise.into();
        self
    }

    /// Lit une balance depuis un fichier, selon son extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CafError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => {
                let file = std::fs::File::open(path)?;
                Self::from_csv_reader(file, &source_name(path))
            }
            "xlsx" | "xlsm" | "xls" | "ods" => Self::from_workbook_path(path),
            _ => Err(CafError::UnsupportedExtension { extension }),
        }
    }

    /// Lit une balance CSV depuis un `Read` arbitraire.
    ///
    /// Le séparateur (virgule ou point-virgule) est détecté sur la ligne
    /// d'en-tête. Les lignes sans libellé sont ignorées ; une ligne dont le
    /// montant est illisible est ignorée avec un avertissement, jamais
    /// fatale.
    pub fn from_csv_reader<R: Read>(mut reader: R, source: &str) -> Result<Self, CafError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(sniff_delimiter(&text))
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let columns = detect_columns(&headers)?;

        let mut items = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let libelle = record.get(columns.libelle).unwrap_or("").trim();
            if libelle.is_empty() {
                continue;
            }
            let montant_raw = record.get(columns.montant).unwrap_or("");
            let Ok(montant) = parse_money_or_zero(montant_raw, "montant") else {
                log::warn!("ligne « {libelle} » ignorée : montant illisible « {montant_raw} »");
                continue;
            };
            let compte = columns
                .compte
                .and_then(|idx| record.get(idx))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            items.push(LineItem {
                libelle: libelle.to_string(),
                compte,
                montant,
            });
        }

        Ok(Self {
            meta: metadata(source, BalanceKind::Csv),
            items,
        })
    }

    /// Lit une balance depuis la première feuille d'un classeur tableur.
    pub fn from_workbook_path<P: AsRef<Path>>(path: P) -> Result<Self, CafError> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(CafError::EmptyWorkbook)?;
        let range = workbook.worksheet_range(&sheet)?;

        let rows: Vec<&[Data]> = range.rows().collect();
        let header = rows
            .iter()
            .take(HEADER_SCAN_ROWS)
            .enumerate()
            .find_map(|(idx, row)| {
                let headers: Vec<String> = row.iter().map(cell_text).collect();
                try_detect_columns(&headers).map(|columns| (idx, columns))
            });
        let Some((header_idx, columns)) = header else {
            // Pas d'en-tête exploitable : l'erreur précise vient de la première ligne.
            let first: Vec<String> = rows
                .first()
                .map(|row| row.iter().map(cell_text).collect())
                .unwrap_or_default();
            return Err(detect_columns(&first)
                .err()
                .unwrap_or(CafError::MissingColumn { column: "libelle" }));
        };

        let mut items = Vec::new();
        for row in rows.iter().skip(header_idx + 1) {
            let libelle = row.get(columns.libelle).map(cell_text).unwrap_or_default();
            if libelle.is_empty() {
                continue;
            }
            let montant_cell = row.get(columns.montant).unwrap_or(&Data::Empty);
            let Some(montant) = cell_money(montant_cell) else {
                log::warn!("ligne « {libelle} » ignorée : montant illisible « {montant_cell} »");
                continue;
            };
            let compte = columns
                .compte
                .and_then(|idx| row.get(idx))
                .map(cell_text)
                .filter(|s| !s.is_empty());
            items.push(LineItem {
                libelle,
                compte,
                montant,
            });
        }

        Ok(Self {
            meta: metadata(&source_name(path), BalanceKind::Spreadsheet),
            items,
        })
    }
}

/// Colonnes retenues après lecture de l'en-tête.
#[derive(Debug, Clone, Copy)]
struct Columns {
    libelle: usize,
    montant: usize,
    compte: Option<usize>,
}

/// Cherche les colonnes sans exiger leur présence.
fn try_detect_columns(headers: &[String]) -> Option<Columns> {
    detect_columns(headers).ok()
}

/// Cherche les colonnes obligatoires (libellé, montant) et le compte.
fn detect_columns(headers: &[String]) -> Result<Columns, CafError> {
    let libelle =
        find_column(headers, LABEL_HEADERS).ok_or(CafError::MissingColumn { column: "libelle" })?;
    let montant =
        find_column(headers, AMOUNT_HEADERS).ok_or(CafError::MissingColumn { column: "montant" })?;
    // La colonne compte est facultative et ne doit pas recouper les deux autres
    // (« Libellé du compte » contient aussi « compte »).
    let compte = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != libelle && *idx != montant)
        .find(|(_, header)| {
            let normalized = normalize_label(header);
            ACCOUNT_HEADERS.iter().any(|c| normalized.contains(c))
        })
        .map(|(idx, _)| idx);
    Ok(Columns {
        libelle,
        montant,
        compte,
    })
}

/// Détecte le séparateur CSV sur la ligne d'en-tête.
fn sniff_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or("");
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Texte d'une cellule de classeur, vide pour les cellules sans valeur.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

/// Montant d'une cellule de classeur, `None` si la cellule est illisible.
fn cell_money(cell: &Data) -> Option<Money> {
    match cell {
        Data::Float(f) => Decimal::from_f64(*f),
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::String(s) => parse_money_or_zero(s, "montant").ok(),
        Data::Empty => Some(Decimal::ZERO),
        _ => None,
    }
}

/// Métadonnées d'une source fraîchement importée.
fn metadata(source: &str, kind: BalanceKind) -> BalanceMetadata {
    BalanceMetadata {
        source: source.to_string(),
        kind,
        exercice: year_from_source(source),
        devise: DEVISE_DEFAUT.to_string(),
        importe_le: Local::now().date_naive(),
    }
}

/// Nom de source dérivé du chemin du fichier.
fn source_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("balance")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn lit_un_csv_point_virgule() {
        let csv = "Libellé;N° de compte;Montant\n\
                   Résultat net de l'exercice;120;1 500,00\n\
                   Dotations aux amortissements;681;250,50\n";
        let balance = Balance::from_csv_reader(csv.as_bytes(), "balance_2023").unwrap();
        assert_eq!(balance.items.len(), 2);
        assert_eq!(balance.meta.exercice, Some(2023));
        assert_eq!(balance.items[0].compte.as_deref(), Some("120"));
        assert_eq!(
            balance.items[0].montant,
            Money::from_str("1500.00").unwrap()
        );
        assert_eq!(
            balance.items[1].montant,
            Money::from_str("250.50").unwrap()
        );
    }

    #[test]
    fn colonne_montant_obligatoire() {
        let csv = "Libellé,Observations\nRésultat net,rien\n";
        let err = Balance::from_csv_reader(csv.as_bytes(), "balance").unwrap_err();
        assert!(matches!(
            err,
            CafError::MissingColumn { column: "montant" }
        ));
    }

    #[test]
    fn montant_illisible_ignore_la_ligne() {
        let csv = "Element,Montant\nRésultat net,100\nDotations,n/a\n,42\n";
        let balance = Balance::from_csv_reader(csv.as_bytes(), "balance").unwrap();
        assert_eq!(balance.items.len(), 1);
        assert_eq!(balance.items[0].libelle, "Résultat net");
    }

    #[test]
    fn cellules_tableur_vers_montants() {
        assert_eq!(
            cell_money(&Data::Float(1234.5)),
            Some(Money::from_str("1234.5").unwrap())
        );
        assert_eq!(cell_money(&Data::Int(42)), Some(Money::from(42)));
        assert_eq!(
            cell_money(&Data::String("1 000,25".to_string())),
            Some(Money::from_str("1000.25").unwrap())
        );
        assert_eq!(cell_money(&Data::Empty), Some(Money::ZERO));
        assert_eq!(cell_money(&Data::Bool(true)), None);
    }

    #[test]
    fn codes_numeriques_de_cellule_sans_decimale() {
        assert_eq!(cell_text(&Data::Float(681.0)), "681");
        assert_eq!(cell_text(&Data::Float(0.5)), "0.5");
    }
}
