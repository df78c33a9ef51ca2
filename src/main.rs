//! CLI : lit une balance, affiche l'état CAF et exporte SVG/PDF sur demande.

use std::env;

use caf_report::{Balance, BarChart, CafStatement, PdfReport, format_montant};

/// Arguments de la ligne de commande.
struct Options {
    path: String,
    svg_out: Option<String>,
    pdf_out: Option<String>,
}

/// Lit les arguments ; `None` quand aucun fichier n'est demandé.
fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Option<Options>, String> {
    let Some(path) = args.next() else {
        return Ok(None);
    };

    let mut svg_out = None;
    let mut pdf_out = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--svg" => {
                svg_out = Some(args.next().ok_or("--svg attend un chemin de fichier")?);
            }
            "--pdf" => {
                pdf_out = Some(args.next().ok_or("--pdf attend un chemin de fichier")?);
            }
            other => return Err(format!("option inconnue : {other}")),
        }
    }
    Ok(Some(Options {
        path,
        svg_out,
        pdf_out,
    }))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(Options {
        path,
        svg_out,
        pdf_out,
    }) = parse_args(env::args().skip(1))?
    else {
        println!(
            "Usage: caf-report <balance.(csv|xlsx|xls|ods)> [--svg <graphique.svg>] [--pdf <rapport.pdf>]"
        );
        return Ok(());
    };

    let balance = Balance::from_path(&path)?;
    let statement = CafStatement::compute(&balance);
    let devise = statement.meta.devise.clone();

    println!(
        "Source : {} ({} lignes)",
        statement.meta.source,
        balance.items.len()
    );
    if let Some(exercice) = statement.meta.exercice {
        println!("Exercice : {exercice}");
    }

    println!();
    println!("Totaux par catégorie :");
    for (category, total) in statement.totals.iter() {
        println!(
            "  {:<30} {}",
            category.libelle(),
            format_montant(total, &devise)
        );
    }

    println!();
    println!(
        "Résultat net        : {}",
        format_montant(statement.figures.resultat_net, &devise)
    );
    println!(
        "CAF                 : {}",
        format_montant(statement.figures.caf, &devise)
    );
    println!(
        "Autofinancement     : {}",
        format_montant(statement.figures.autofinancement, &devise)
    );
    if let Some(taux) = statement.figures.taux_financement {
        println!("Taux de financement : {}", format_montant(taux, "%"));
    }

    if let Some(interpretation) = &statement.interpretation {
        println!();
        for message in &interpretation.messages {
            println!("{message}");
        }
    }

    if let Some(svg_path) = svg_out {
        BarChart::from_figures(&statement.figures, &devise).render_to(&svg_path)?;
        println!();
        println!("Graphique écrit : {svg_path}");
    }
    if let Some(pdf_path) = pdf_out {
        PdfReport::new(&statement).save(&pdf_path)?;
        println!("Rapport PDF écrit : {pdf_path}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Options>, String> {
        parse_args(args.iter().map(ToString::to_string))
    }

    #[test]
    fn arguments_complets() {
        let options = parse(&["balance.csv", "--svg", "g.svg", "--pdf", "r.pdf"])
            .unwrap()
            .unwrap();
        assert_eq!(options.path, "balance.csv");
        assert_eq!(options.svg_out.as_deref(), Some("g.svg"));
        assert_eq!(options.pdf_out.as_deref(), Some("r.pdf"));
    }

    #[test]
    fn sans_argument() {
        assert!(parse(&[]).unwrap().is_none());
    }

    #[test]
    fn option_sans_valeur_refusee() {
        assert!(parse(&["balance.csv", "--svg"]).is_err());
        assert!(parse(&["balance.csv", "--pdf"]).is_err());
    }

    #[test]
    fn option_inconnue_refusee() {
        assert!(parse(&["balance.csv", "--xml"]).is_err());
    }
}
