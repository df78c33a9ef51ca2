//! Calcul de la CAF et construction de l'état de synthèse.

use crate::balance::Balance;
use crate::classify::categorize;
use crate::types::{
    BalanceMetadata, CafCategory, CafFigures, CategorizedRow, CategoryTotals, Interpretation,
};
use crate::utils::format_montant;
use rust_decimal::Decimal;

/// Blocs facultatifs à produire (type interne).
#[derive(Debug, Clone, Copy)]
pub(crate) struct ComputeOptions {
    pub load_detail: bool,
    pub load_interpretation: bool,
}

impl ComputeOptions {
    /// Produit tous les blocs connus.
    pub const fn everything() -> Self {
        Self {
            load_detail: true,
            load_interpretation: true,
        }
    }
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self::everything()
    }
}

impl CafFigures {
    /// Applique la formule aux totaux par catégorie.
    ///
    /// CAF = résultat net + dotations + valeur de cession − reprises −
    /// produits de cession − subventions ; autofinancement = CAF − dividendes.
    #[must_use]
    pub fn from_totals(totals: &CategoryTotals) -> Self {
        let resultat_net = totals.get(CafCategory::ResultatNet);
        let dotations = totals.get(CafCategory::Dotations);
        let valeur_cession = totals.get(CafCategory::ValeurCessionActifs);
        let reprises = totals.get(CafCategory::Reprises);
        let produits_cession = totals.get(CafCategory::ProduitsCession);
        let subventions = totals.get(CafCategory::SubventionsInvestissement);
        let dividendes = totals.get(CafCategory::Dividendes);

        let caf = resultat_net + dotations + valeur_cession
            - reprises
            - produits_cession
            - subventions;
        let autofinancement = caf - dividendes;

        let investissement_net =
            totals.get(CafCategory::Investissements) - totals.get(CafCategory::Desinvestissements);
        let taux_financement = if investissement_net.is_zero() {
            None
        } else {
            Some(autofinancement / investissement_net * Decimal::ONE_HUNDRED)
        };

        Self {
            resultat_net,
            dotations,
            valeur_cession,
            reprises,
            produits_cession,
            subventions,
            dividendes,
            caf,
            autofinancement,
            taux_financement,
        }
    }
}

impl Interpretation {
    /// Commente chaque grandeur selon son signe, à la manière du rapport.
    #[must_use]
    pub fn from_figures(figures: &CafFigures, devise: &str) -> Self {
        let mut messages = Vec::new();

        if figures.resultat_net > Decimal::ZERO {
            messages.push(format!(
                "Résultat net positif : {}",
                format_montant(figures.resultat_net, devise)
            ));
        } else {
            messages.push(format!(
                "Résultat net négatif : {}",
                format_montant(figures.resultat_net, devise)
            ));
        }

        if figures.caf > Decimal::ZERO {
            messages.push(format!(
                "CAF positive : {} — l'activité dégage des ressources internes",
                format_montant(figures.caf, devise)
            ));
        } else {
            messages.push(format!(
                "CAF négative : {} — l'activité consomme des ressources",
                format_montant(figures.caf, devise)
            ));
        }

        if figures.autofinancement > Decimal::ZERO {
            messages.push(format!(
                "Autofinancement positif : {}",
                format_montant(figures.autofinancement, devise)
            ));
        } else {
            messages.push(format!(
                "Autofinancement négatif : {}",
                format_montant(figures.autofinancement, devise)
            ));
        }

        if let Some(taux) = figures.taux_financement {
            let detail = if taux >= Decimal::ONE_HUNDRED {
                "les investissements sont intégralement autofinancés"
            } else {
                "les investissements ne sont que partiellement autofinancés"
            };
            messages.push(format!(
                "Taux de financement des investissements : {} — {detail}",
                format_montant(taux, "%")
            ));
        }

        Self { messages }
    }
}

/// État de synthèse d'une balance : totaux, grandeurs et lecture.
#[derive(Debug, Clone)]
pub struct CafStatement {
    /// Métadonnées de la balance source.
    pub meta: BalanceMetadata,
    /// Totaux par catégorie.
    pub totals: CategoryTotals,
    /// Grandeurs calculées.
    pub figures: CafFigures,
    /// Détail des lignes classées, si demandé.
    pub detail: Option<Vec<CategorizedRow>>,
    /// Lecture des grandeurs, si demandée.
    pub interpretation: Option<Interpretation>,
}

impl CafStatement {
    /// Calcule l'état complet d'une balance.
    #[inline]
    #[must_use]
    pub fn compute(balance: &Balance) -> Self {
        Self::compute_with_options(balance, ComputeOptions::everything())
    }

    /// Calcule l'état avec les options internes (utilisé par le builder).
    pub(crate) fn compute_with_options(balance: &Balance, options: ComputeOptions) -> Self {
        let rows = categorize(&balance.items);
        let totals = CategoryTotals::from_rows(&rows);
        let figures = CafFigures::from_totals(&totals);
        let interpretation = options
            .load_interpretation
            .then(|| Interpretation::from_figures(&figures, &balance.meta.devise));
        let detail = options.load_detail.then_some(rows);

        Self {
            meta: balance.meta.clone(),
            totals,
            figures,
            detail,
            interpretation,
        }
    }
}

/// Builder pour calculer un [`CafStatement`] en choisissant les blocs.
pub struct CafStatementBuilder<'a> {
    balance: &'a Balance,
    options: ComputeOptions,
}

impl<'a> CafStatementBuilder<'a> {
    /// Crée un builder pour la balance indiquée.
    #[inline]
    #[must_use]
    pub const fn new(balance: &'a Balance) -> Self {
        Self {
            balance,
            options: ComputeOptions::everything(),
        }
    }

    /// Active ou désactive le détail des lignes classées.
    #[inline]
    #[must_use]
    pub const fn detail(mut self, enabled: bool) -> Self {
        self.options.load_detail = enabled;
        self
    }

    /// Active ou désactive la lecture commentée des grandeurs.
    #[inline]
    #[must_use]
    pub const fn interpretation(mut self, enabled: bool) -> Self {
        self.options.load_interpretation = enabled;
        self
    }

    /// Calcule l'état avec les réglages courants.
    #[inline]
    #[must_use]
    pub fn compute(self) -> CafStatement {
        CafStatement::compute_with_options(self.balance, self.options)
    }
}
