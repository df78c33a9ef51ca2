//! Ensembles d'états CAF et fonctions d'agrégation multi-exercices.

use crate::balance::Balance;
use crate::error::CafError;
use crate::statement::{CafStatement, CafStatementBuilder};
use crate::types::{CategoryTotals, Money};
use std::collections::BTreeMap;
use std::fs::{self, DirEntry};
use std::path::Path;

/// Extensions de fichiers chargées depuis un répertoire.
const BALANCE_EXTENSIONS: &[&str] = &["csv", "xlsx", "xlsm", "xls", "ods"];

/// CAF et autofinancement d'un exercice.
#[derive(Debug, Clone)]
pub struct ExerciceCaf {
    /// Millésime de l'exercice, si connu.
    pub exercice: Option<i32>,
    /// CAF cumulée de l'exercice.
    pub caf: Money,
    /// Autofinancement cumulé de l'exercice.
    pub autofinancement: Money,
}

/// Ensemble d'états CAF avec utilitaires d'agrégation.
#[derive(Debug, Clone, Default)]
pub struct CafSet {
    /// États calculés.
    pub statements: Vec<CafStatement>,
}

impl CafSet {
    /// Charge et calcule toutes les balances d'un répertoire.
    #[inline]
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CafError> {
        Self::from_dir_with(dir, |builder| builder.compute())
    }

    /// Charge toutes les balances d'un répertoire en réglant le builder.
    ///
    /// # Exemple
    ///
    /// ```no_run
    /// # use caf_report::CafSet;
    /// let set = CafSet::from_dir_with("balances/", |builder| {
    ///     builder.detail(false).interpretation(false).compute()
    /// })
    /// .unwrap();
    /// assert!(!set.statements.is_empty());
    /// ```
    pub fn from_dir_with<P, F>(dir: P, mut compute_fn: F) -> Result<Self, CafError>
    where
        P: AsRef<Path>,
        for<'a> F: FnMut(CafStatementBuilder<'a>) -> CafStatement,
    {
        let mut entries: Vec<_> = fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .collect();
        // Ordre de fichiers déterministe.
        entries.sort_by_key(DirEntry::path);

        let mut statements = Vec::new();
        for entry in entries {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(extension) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            if !BALANCE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
                continue;
            }

            let balance = Balance::from_path(&path)?;
            statements.push(compute_fn(CafStatementBuilder::new(&balance)));
        }

        Ok(Self { statements })
    }

    /// Itérateur sur les états d'un exercice donné.
    #[inline]
    pub fn by_exercice(&self, exercice: i32) -> impl Iterator<Item = &CafStatement> {
        self.statements
            .iter()
            .filter(move |s| s.meta.exercice == Some(exercice))
    }

    /// Cumule les totaux par catégorie de tous les états.
    #[must_use]
    pub fn merge_totals(&self) -> CategoryTotals {
        let mut merged = CategoryTotals::default();
        for statement in &self.statements {
            for (category, total) in statement.totals.iter() {
                merged.add(category, total);
            }
        }
        merged
    }

    /// CAF et autofinancement cumulés par exercice, millésimes croissants.
    ///
    /// Les états sans millésime sont regroupés en tête sous `None`.
    #[must_use]
    pub fn caf_par_exercice(&self) -> Vec<ExerciceCaf> {
        let mut map: BTreeMap<Option<i32>, (Money, Money)> = BTreeMap::new();
        for statement in &self.statements {
            let entry = map
                .entry(statement.meta.exercice)
                .or_insert((Money::ZERO, Money::ZERO));
            entry.0 += statement.figures.caf;
            entry.1 += statement.figures.autofinancement;
        }

        map.into_iter()
            .map(|(exercice, (caf, autofinancement))| ExerciceCaf {
                exercice,
                caf,
                autofinancement,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;
    use rust_decimal::Decimal;

    fn balance(source: &str, resultat: i64) -> Balance {
        Balance::from_items(
            vec![LineItem {
                libelle: "Résultat net de l'exercice".to_string(),
                compte: Some("120".to_string()),
                montant: Decimal::from(resultat),
            }],
            source,
        )
    }

    fn set_exemple() -> CafSet {
        CafSet {
            statements: vec![
                CafStatement::compute(&balance("balance_2021", 100)),
                CafStatement::compute(&balance("balance_2022", 250)),
                CafStatement::compute(&balance("annexe_2022", 50)),
            ],
        }
    }

    #[test]
    fn filtre_par_exercice() {
        let set = set_exemple();
        assert_eq!(set.by_exercice(2022).count(), 2);
        assert_eq!(set.by_exercice(2021).count(), 1);
        assert_eq!(set.by_exercice(1999).count(), 0);
    }

    #[test]
    fn cumul_par_exercice() {
        let par_exercice = set_exemple().caf_par_exercice();
        assert_eq!(par_exercice.len(), 2);
        assert_eq!(par_exercice[0].exercice, Some(2021));
        assert_eq!(par_exercice[0].caf, Decimal::from(100));
        assert_eq!(par_exercice[1].exercice, Some(2022));
        assert_eq!(par_exercice[1].caf, Decimal::from(300));
    }

    #[test]
    fn fusion_des_totaux() {
        let merged = set_exemple().merge_totals();
        assert_eq!(
            merged.get(crate::types::CafCategory::ResultatNet),
            Decimal::from(400)
        );
    }
}
