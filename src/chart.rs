//! Diagramme en barres SVG des grandeurs calculées.

use crate::error::CafError;
use crate::types::{CafFigures, Money};
use crate::utils::format_montant;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use svg::Document;
use svg::node::element::{Line, Rectangle, Text};

/// Couleurs des barres : résultat net, CAF, autofinancement.
const COLORS: &[&str] = &["#FF5722", "#2196F3", "#4CAF50"];

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN: f64 = 40.0;
const LABEL_BAND: f64 = 30.0;

/// Diagramme en barres d'une série de grandeurs monétaires.
#[derive(Debug, Clone)]
pub struct BarChart {
    bars: Vec<(String, Money)>,
    devise: String,
}

impl BarChart {
    /// Diagramme des trois grandeurs clés d'un état CAF.
    #[must_use]
    pub fn from_figures(figures: &CafFigures, devise: &str) -> Self {
        Self {
            bars: vec![
                ("Résultat Net".to_string(), figures.resultat_net),
                ("CAF".to_string(), figures.caf),
                ("Autofinancement".to_string(), figures.autofinancement),
            ],
            devise: devise.to_string(),
        }
    }

    /// Écrit le diagramme dans un fichier SVG.
    pub fn render_to<P: AsRef<Path>>(&self, path: P) -> Result<(), CafError> {
        svg::save(path, &self.to_document())?;
        Ok(())
    }

    /// Construit le document SVG du diagramme.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let values: Vec<f64> = self
            .bars
            .iter()
            .map(|(_, v)| v.to_f64().unwrap_or(0.0))
            .collect();

        // L'axe zéro reste toujours visible, marge de 15 % pour les étiquettes.
        let mut ymax = values.iter().copied().fold(0.0_f64, f64::max) * 1.15;
        let mut ymin = values.iter().copied().fold(0.0_f64, f64::min) * 1.15;
        if ymax - ymin < f64::EPSILON {
            ymax = 1.0;
            ymin = 0.0;
        }

        let plot_height = HEIGHT - LABEL_BAND;
        let resize_y = |v: f64| (ymax - v) / (ymax - ymin) * plot_height;

        let slot = WIDTH / self.bars.len() as f64;
        let bar_width = slot * 0.6;
        let baseline = resize_y(0.0);

        let mut document = Document::new()
            .set(
                "viewBox",
                (
                    -MARGIN,
                    -MARGIN,
                    WIDTH + 2.0 * MARGIN,
                    HEIGHT + 2.0 * MARGIN,
                ),
            )
            .set("font-family", "sans-serif");

        for (i, ((label, montant), value)) in self.bars.iter().zip(&values).enumerate() {
            let x = i as f64 * slot + (slot - bar_width) / 2.0;
            let top = resize_y(value.max(0.0));
            let bottom = resize_y(value.min(0.0));

            let bar = Rectangle::new()
                .set("x", x)
                .set("y", top)
                .set("width", bar_width)
                .set("height", bottom - top)
                .set("fill", COLORS[i % COLORS.len()]);
            document = document.add(bar);

            // Montant au-dessus d'une barre positive, au-dessous sinon.
            let value_y = if *value >= 0.0 { top - 6.0 } else { bottom + 14.0 };
            let value_text = Text::new()
                .set("x", x + bar_width / 2.0)
                .set("y", value_y)
                .set("text-anchor", "middle")
                .set("font-size", 13)
                .add(svg::node::Text::new(format_montant(
                    montant.round_dp(0),
                    &self.devise,
                )));
            document = document.add(value_text);

            let label_text = Text::new()
                .set("x", x + bar_width / 2.0)
                .set("y", HEIGHT - 6.0)
                .set("text-anchor", "middle")
                .set("font-size", 14)
                .add(svg::node::Text::new(label.clone()));
            document = document.add(label_text);
        }

        let xaxis = Line::new()
            .set("x1", 0.0)
            .set("x2", WIDTH)
            .set("y1", baseline)
            .set("y2", baseline)
            .set("stroke", "black")
            .set("stroke-width", 2.0);
        let yaxis = Line::new()
            .set("x1", 0.0)
            .set("x2", 0.0)
            .set("y1", 0.0)
            .set("y2", plot_height)
            .set("stroke", "black")
            .set("stroke-width", 2.0);

        document.add(xaxis).add(yaxis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryTotals;

    fn figures_exemple(resultat: i64) -> CafFigures {
        let mut totals = CategoryTotals::default();
        totals.add(crate::types::CafCategory::ResultatNet, Money::from(resultat));
        CafFigures::from_totals(&totals)
    }

    #[test]
    fn document_contient_les_trois_barres() {
        let chart = BarChart::from_figures(&figures_exemple(1000), "DZD");
        let rendered = chart.to_document().to_string();
        for color in COLORS {
            assert!(rendered.contains(color));
        }
        assert!(rendered.contains("Autofinancement"));
        assert!(rendered.contains("DZD"));
    }

    #[test]
    fn valeurs_negatives_sans_panique() {
        let chart = BarChart::from_figures(&figures_exemple(-500), "DZD");
        let rendered = chart.to_document().to_string();
        assert!(rendered.contains("rect"));
    }
}
