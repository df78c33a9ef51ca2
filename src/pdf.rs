//! Export de l'état CAF en rapport PDF (A4, polices intégrées).

use crate::error::CafError;
use crate::statement::CafStatement;
use crate::types::Interpretation;
use crate::utils::format_montant;
use chrono::Local;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect, Rgb,
};
use rust_decimal::prelude::ToPrimitive;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Couleurs RVB des barres : résultat net, CAF, autofinancement.
const BAR_COLORS: &[(f32, f32, f32)] = &[
    (1.0, 0.341, 0.133),
    (0.129, 0.588, 0.953),
    (0.298, 0.686, 0.314),
];

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;

/// Rapport PDF construit à partir d'un état CAF.
pub struct PdfReport<'a> {
    statement: &'a CafStatement,
}

impl<'a> PdfReport<'a> {
    /// Prépare le rapport pour l'état indiqué.
    #[inline]
    #[must_use]
    pub const fn new(statement: &'a CafStatement) -> Self {
        Self { statement }
    }

    /// Génère le document et l'écrit dans le fichier indiqué.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CafError> {
        let (doc, page, layer) = PdfDocument::new(
            "Rapport d'Autofinancement",
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Rapport",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| CafError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| CafError::Pdf(e.to_string()))?;

        let layer = doc.get_page(page).get_layer(layer);
        layer.set_fill_color(Color::Rgb(Rgb::new(0.1, 0.1, 0.1, None)));

        layer.use_text(
            "Rapport d'Autofinancement",
            20.0,
            Mm(MARGIN),
            Mm(270.0),
            &bold,
        );
        layer.use_text(
            format!("Généré le {}", Local::now().format("%d/%m/%Y à %H:%M")),
            10.0,
            Mm(MARGIN),
            Mm(262.0),
            &regular,
        );
        separator(&layer, 258.0);

        layer.use_text("Résultats clés", 14.0, Mm(MARGIN), Mm(248.0), &bold);
        let devise = &self.statement.meta.devise;
        let figures = &self.statement.figures;
        let mut y = 240.0;
        let mut key_line = |label: &str, value: String| {
            layer.use_text(label, 11.0, Mm(MARGIN), Mm(y), &regular);
            layer.use_text(value, 11.0, Mm(110.0), Mm(y), &bold);
            y -= 8.0;
        };
        key_line("Source", self.statement.meta.source.clone());
        if let Some(exercice) = self.statement.meta.exercice {
            key_line("Exercice", exercice.to_string());
        }
        key_line(
            "Résultat net de l'exercice",
            format_montant(figures.resultat_net, devise),
        );
        key_line(
            "Capacité d'Autofinancement (CAF)",
            format_montant(figures.caf, devise),
        );
        key_line(
            "Autofinancement",
            format_montant(figures.autofinancement, devise),
        );
        if let Some(taux) = figures.taux_financement {
            key_line(
                "Taux de financement des investissements",
                format_montant(taux, "%"),
            );
        }

        layer.use_text("Visualisation", 14.0, Mm(MARGIN), Mm(196.0), &bold);
        self.draw_bars(&layer, &regular);

        layer.use_text("Interprétation", 14.0, Mm(MARGIN), Mm(96.0), &bold);
        let own_interpretation;
        let interpretation = match &self.statement.interpretation {
            Some(interpretation) => interpretation,
            None => {
                own_interpretation = Interpretation::from_figures(figures, devise);
                &own_interpretation
            }
        };
        let mut y = 88.0;
        for message in &interpretation.messages {
            layer.use_text(message.as_str(), 10.0, Mm(MARGIN), Mm(y), &regular);
            y -= 7.0;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        doc.save(&mut writer)
            .map_err(|e| CafError::Pdf(e.to_string()))?;
        Ok(())
    }

    /// Dessine le diagramme en barres des trois grandeurs clés.
    fn draw_bars(&self, layer: &PdfLayerReference, font: &IndirectFontRef) {
        let figures = &self.statement.figures;
        let bars = [
            ("Résultat Net", figures.resultat_net),
            ("CAF", figures.caf),
            ("Autofinancement", figures.autofinancement),
        ];
        let values: Vec<f32> = bars
            .iter()
            .map(|(_, v)| v.to_f32().unwrap_or(0.0))
            .collect();

        let mut ymax = values.iter().copied().fold(0.0_f32, f32::max);
        let mut ymin = values.iter().copied().fold(0.0_f32, f32::min);
        if ymax - ymin < f32::EPSILON {
            ymax = 1.0;
            ymin = 0.0;
        }
        let band = 70.0;
        let scale = band / (ymax - ymin);
        let baseline = 115.0 + (0.0 - ymin) * scale;

        let chart_left = 30.0;
        let slot = 50.0;
        let bar_width = 30.0;

        for (i, ((label, montant), value)) in bars.iter().zip(&values).enumerate() {
            let x = chart_left + i as f32 * slot;
            let y_low = value.min(0.0).mul_add(scale, baseline);
            let y_high = value.max(0.0).mul_add(scale, baseline);
            let (r, g, b) = BAR_COLORS[i % BAR_COLORS.len()];

            layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
            layer.add_rect(
                Rect::new(Mm(x), Mm(y_low), Mm(x + bar_width), Mm(y_high))
                    .with_mode(PaintMode::Fill),
            );

            layer.set_fill_color(Color::Rgb(Rgb::new(0.1, 0.1, 0.1, None)));
            let value_y = if *value >= 0.0 { y_high + 3.0 } else { y_low - 5.0 };
            layer.use_text(
                format_montant(montant.round_dp(0), &self.statement.meta.devise),
                8.0,
                Mm(x),
                Mm(value_y),
                font,
            );
            layer.use_text(*label, 9.0, Mm(x), Mm(107.0), font);
        }

        layer.set_fill_color(Color::Rgb(Rgb::new(0.1, 0.1, 0.1, None)));
        axis(layer, baseline);
    }
}

/// Trait horizontal fin sur toute la largeur utile.
fn separator(layer: &PdfLayerReference, y: f32) {
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(y)), false),
        ],
        is_closed: false,
    });
}

/// Axe zéro du diagramme.
fn axis(layer: &PdfLayerReference, baseline: f32) {
    layer.set_outline_thickness(0.6);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(25.0), Mm(baseline)), false),
            (Point::new(Mm(185.0), Mm(baseline)), false),
        ],
        is_closed: false,
    });
}
