//! Classement des lignes de balance dans les catégories CAF.

use crate::types::{CafCategory, CategorizedRow, LineItem};
use crate::utils::normalize_label;

/// Table préfixe de compte → catégorie. Les préfixes les plus longs
/// figurent en premier : le premier préfixe correspondant l'emporte.
const PREFIX_TABLE: &[(&str, CafCategory)] = &[
    ("681", CafCategory::Dotations),
    ("686", CafCategory::Dotations),
    ("687", CafCategory::Dotations),
    ("675", CafCategory::ValeurCessionActifs),
    ("781", CafCategory::Reprises),
    ("786", CafCategory::Reprises),
    ("787", CafCategory::Reprises),
    ("775", CafCategory::ProduitsCession),
    ("777", CafCategory::SubventionsInvestissement),
    ("457", CafCategory::Dividendes),
    ("12", CafCategory::ResultatNet),
];

/// Classe un numéro de compte par son préfixe.
fn classify_compte(compte: &str) -> Option<CafCategory> {
    let compte = compte.trim();
    if !compte.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
        return None;
    }
    PREFIX_TABLE
        .iter()
        .find(|(prefix, _)| compte.starts_with(prefix))
        .map(|(_, category)| *category)
}

/// Classe un libellé normalisé par mots-clés.
///
/// L'ordre des tests compte : « reprises sur pertes de valeur » doit être
/// reconnu avant la règle valeur/cession, et « subventions
/// d'investissement » avant la règle investissement.
fn classify_libelle(libelle: &str) -> CafCategory {
    if libelle.contains("resultat net") {
        CafCategory::ResultatNet
    } else if libelle.contains("dotation") {
        CafCategory::Dotations
    } else if libelle.contains("reprise") {
        CafCategory::Reprises
    } else if libelle.contains("valeur") && (libelle.contains("cession") || libelle.contains("cede"))
    {
        CafCategory::ValeurCessionActifs
    } else if libelle.contains("produit") && libelle.contains("cession") {
        CafCategory::ProduitsCession
    } else if libelle.contains("quote-part")
        || (libelle.contains("subvention") && libelle.contains("investissement"))
    {
        CafCategory::SubventionsInvestissement
    } else if libelle.contains("dividende") {
        CafCategory::Dividendes
    } else if libelle.contains("desinvestissement") || libelle.contains("cession d'immobilisation")
    {
        CafCategory::Desinvestissements
    } else if libelle.contains("investissement") || libelle.contains("acquisition d'immobilisation")
    {
        CafCategory::Investissements
    } else {
        CafCategory::Autre
    }
}

/// Classe une ligne : préfixe de compte d'abord, libellé sinon.
///
/// Un numéro de compte inconnu ou mal formé ne rattache la ligne à aucune
/// catégorie par lui-même ; on retombe alors sur le libellé, puis sur
/// [`CafCategory::Autre`], qui ne pèse pas dans la CAF.
#[must_use]
pub fn classify_line(item: &LineItem) -> CafCategory {
    if let Some(compte) = item.compte.as_deref() {
        if let Some(category) = classify_compte(compte) {
            return category;
        }
    }
    classify_libelle(&normalize_label(&item.libelle))
}

/// Classe toutes les lignes d'une balance.
#[must_use]
pub fn categorize(items: &[LineItem]) -> Vec<CategorizedRow> {
    items
        .iter()
        .map(|item| CategorizedRow {
            category: classify_line(item),
            libelle_raw: item.libelle.clone(),
            compte: item.compte.clone(),
            montant: item.montant,
        })
        .collect()
}
