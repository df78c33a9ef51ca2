//! Types du domaine : lignes de balance, catégories et agrégats CAF.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Valeur monétaire, on utilise `Decimal` pour des calculs exacts.
pub type Money = Decimal;

/// Format du fichier source d'une balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    /// Fichier CSV.
    Csv,
    /// Classeur tableur (xlsx, xls ou ods).
    Spreadsheet,
    /// Balance construite en mémoire.
    Memoire,
}

/// Métadonnées d'une balance importée.
#[derive(Debug, Clone)]
pub struct BalanceMetadata {
    /// Nom de la source (nom de fichier sans extension, en général).
    pub source: String,
    /// Format du fichier d'origine.
    pub kind: BalanceKind,
    /// Exercice comptable, si un millésime figure dans le nom de fichier.
    pub exercice: Option<i32>,
    /// Devise des montants.
    pub devise: String,
    /// Date d'import de la balance.
    pub importe_le: NaiveDate,
}

/// Ligne de balance : libellé, numéro de compte facultatif, montant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Libellé tel qu'il figure dans le fichier.
    pub libelle: String,
    /// Numéro de compte, si la colonne existe.
    pub compte: Option<String>,
    /// Montant de la ligne.
    pub montant: Money,
}

/// Catégorie d'une ligne dans le calcul de la CAF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CafCategory {
    /// Résultat net de l'exercice (comptes 12).
    ResultatNet,
    /// Dotations aux amortissements et provisions (681, 686, 687).
    Dotations,
    /// Valeur comptable des actifs cédés (675).
    ValeurCessionActifs,
    /// Reprises sur amortissements et provisions (781, 786, 787).
    Reprises,
    /// Produits de cession d'actifs (775).
    ProduitsCession,
    /// Quote-part des subventions d'investissement virée au résultat (777).
    SubventionsInvestissement,
    /// Dividendes versés (457).
    Dividendes,
    /// Acquisitions d'immobilisations de l'exercice.
    Investissements,
    /// Cessions d'immobilisations de l'exercice.
    Desinvestissements,
    /// Ligne sans incidence sur la CAF.
    Autre,
}

impl CafCategory {
    /// Signe de la catégorie dans la somme CAF, `None` hors formule.
    #[must_use]
    pub const fn signe_caf(self) -> Option<i8> {
        match self {
            Self::ResultatNet | Self::Dotations | Self::ValeurCessionActifs => Some(1),
            Self::Reprises | Self::ProduitsCession | Self::SubventionsInvestissement => Some(-1),
            _ => None,
        }
    }

    /// Libellé d'affichage de la catégorie.
    #[must_use]
    pub const fn libelle(self) -> &'static str {
        match self {
            Self::ResultatNet => "Résultat net",
            Self::Dotations => "Dotations",
            Self::ValeurCessionActifs => "Valeur de cession d'actifs",
            Self::Reprises => "Reprises",
            Self::ProduitsCession => "Produits de cession",
            Self::SubventionsInvestissement => "Subventions d'investissement",
            Self::Dividendes => "Dividendes versés",
            Self::Investissements => "Investissements",
            Self::Desinvestissements => "Désinvestissements",
            Self::Autre => "Autre",
        }
    }
}

/// Ligne de balance après classement dans sa catégorie CAF.
#[derive(Debug, Clone)]
pub struct CategorizedRow {
    /// Catégorie retenue.
    pub category: CafCategory,
    /// Libellé d'origine de la ligne.
    pub libelle_raw: String,
    /// Numéro de compte d'origine, s'il existait.
    pub compte: Option<String>,
    /// Montant de la ligne.
    pub montant: Money,
}

/// Totaux par catégorie CAF.
#[derive(Debug, Clone, Default)]
pub struct CategoryTotals {
    totals: BTreeMap<CafCategory, Money>,
}

impl CategoryTotals {
    /// Somme les lignes classées par catégorie.
    #[must_use]
    pub fn from_rows(rows: &[CategorizedRow]) -> Self {
        let mut totals: BTreeMap<CafCategory, Money> = BTreeMap::new();
        for row in rows {
            *totals.entry(row.category).or_insert(Decimal::ZERO) += row.montant;
        }
        Self { totals }
    }

    /// Total d'une catégorie, zéro si aucune ligne ne s'y rattache.
    #[must_use]
    pub fn get(&self, category: CafCategory) -> Money {
        self.totals.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    /// Ajoute un montant au total d'une catégorie.
    pub fn add(&mut self, category: CafCategory, montant: Money) {
        *self.totals.entry(category).or_insert(Decimal::ZERO) += montant;
    }

    /// Itérateur sur les couples (catégorie, total), par ordre de catégorie.
    pub fn iter(&self) -> impl Iterator<Item = (CafCategory, Money)> + '_ {
        self.totals.iter().map(|(cat, total)| (*cat, *total))
    }

    /// Vrai si aucune catégorie n'a reçu de montant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Grandeurs calculées : composantes de la formule, CAF et dérivés.
#[derive(Debug, Clone)]
pub struct CafFigures {
    /// Résultat net de l'exercice.
    pub resultat_net: Money,
    /// Dotations aux amortissements et provisions.
    pub dotations: Money,
    /// Valeur comptable des actifs cédés.
    pub valeur_cession: Money,
    /// Reprises sur amortissements et provisions.
    pub reprises: Money,
    /// Produits de cession d'actifs.
    pub produits_cession: Money,
    /// Quote-part des subventions d'investissement.
    pub subventions: Money,
    /// Dividendes versés au titre de l'exercice.
    pub dividendes: Money,
    /// Capacité d'autofinancement.
    pub caf: Money,
    /// Autofinancement (CAF moins dividendes).
    pub autofinancement: Money,
    /// Taux de financement des investissements, en pourcentage.
    /// `None` si l'exercice n'a ni investissement net ni désinvestissement net.
    pub taux_financement: Option<Money>,
}

/// Lecture des grandeurs sous forme de messages.
#[derive(Debug, Clone)]
pub struct Interpretation {
    /// Messages, un par grandeur commentée.
    pub messages: Vec<String>,
}
