use caf_report::{
    Balance, BalanceKind, BarChart, CafCategory, CafError, CafSet, CafStatement,
    CafStatementBuilder, Money, PdfReport,
};
use std::str::FromStr;

fn load_fixture(name: &str) -> CafStatement {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let balance = Balance::from_path(path).expect("read fixture");
    CafStatement::compute(&balance)
}

fn fixtures_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[test]
fn calcule_la_balance_avec_comptes() {
    let statement = load_fixture("balance_2023.csv");
    assert_eq!(statement.meta.exercice, Some(2023));
    assert_eq!(statement.meta.kind, BalanceKind::Csv);

    // 1500 + 400 + 100 + 250 − 120 − 300 − 60 = 1770.
    assert_eq!(statement.figures.caf, Money::from(1770));
    assert_eq!(statement.figures.autofinancement, Money::from(1270));
    assert_eq!(statement.figures.dividendes, Money::from(500));
    assert_eq!(statement.figures.taux_financement, None);

    // Les lignes hors formule (63, code malformé) vont dans Autre.
    assert_eq!(
        statement.totals.get(CafCategory::Autre),
        Money::from(9123)
    );
}

#[test]
fn calcule_le_tcr_sans_colonne_compte() {
    let statement = load_fixture("tcr_2022.csv");
    assert_eq!(statement.meta.exercice, Some(2022));

    // 2000 + 500,50 − 150 − 100 − 50 = 2200,50.
    assert_eq!(statement.figures.caf, Money::from_str("2200.50").unwrap());
    assert_eq!(
        statement.figures.autofinancement,
        Money::from_str("1900.50").unwrap()
    );
    // 1900,50 / (4000 − 1000) × 100 = 63,35 %.
    assert_eq!(
        statement.figures.taux_financement,
        Some(Money::from_str("63.35").unwrap())
    );
    // Les subventions d'exploitation ne pèsent pas dans la formule.
    assert_eq!(statement.totals.get(CafCategory::Autre), Money::from(999));
}

#[test]
fn calcule_le_classeur_avec_entete_decalee() {
    // Titre en première ligne, en-tête réelle en troisième.
    let statement = load_fixture("balance_2021.xlsx");
    assert_eq!(statement.meta.kind, BalanceKind::Spreadsheet);
    assert_eq!(statement.meta.exercice, Some(2021));

    // 2000 + 600 − 150 − 300 = 2150.
    assert_eq!(statement.figures.caf, Money::from(2150));
    assert_eq!(statement.figures.autofinancement, Money::from(1750));
    assert_eq!(statement.totals.get(CafCategory::Autre), Money::from(5000));

    let detail = statement.detail.as_ref().expect("detail");
    assert_eq!(detail[0].compte.as_deref(), Some("12"));
}

#[test]
fn classeur_sans_entete_est_refuse() {
    let path = fixtures_dir().join("invalides").join("notes_sans_entete.xlsx");
    let err = Balance::from_path(path).unwrap_err();
    assert!(matches!(
        err,
        CafError::MissingColumn { column: "libelle" }
    ));
}

#[test]
fn autofinancement_jamais_superieur_a_la_caf() {
    for fixture in ["balance_2021.xlsx", "balance_2023.csv", "tcr_2022.csv"] {
        let statement = load_fixture(fixture);
        assert!(statement.figures.dividendes >= Money::ZERO);
        assert!(statement.figures.autofinancement <= statement.figures.caf);
    }
}

#[test]
fn builder_sans_interpretation() {
    let path = fixtures_dir().join("balance_2023.csv");
    let balance = Balance::from_path(path).expect("read fixture");
    let statement = CafStatementBuilder::new(&balance)
        .detail(false)
        .interpretation(false)
        .compute();
    assert!(statement.detail.is_none());
    assert!(statement.interpretation.is_none());
    assert_eq!(statement.figures.caf, Money::from(1770));
}

#[test]
fn charge_le_repertoire_de_fixtures() {
    let set = CafSet::from_dir(fixtures_dir()).expect("parse fixtures dir");
    assert_eq!(set.statements.len(), 3);
    assert_eq!(set.by_exercice(2023).count(), 1);

    let par_exercice = set.caf_par_exercice();
    assert_eq!(par_exercice.len(), 3);
    assert_eq!(par_exercice[0].exercice, Some(2021));
    assert_eq!(par_exercice[0].caf, Money::from(2150));
    assert_eq!(par_exercice[1].exercice, Some(2022));
    assert_eq!(par_exercice[2].exercice, Some(2023));
    assert_eq!(par_exercice[2].caf, Money::from(1770));

    let merged = set.merge_totals();
    assert_eq!(
        merged.get(CafCategory::ResultatNet),
        Money::from_str("5500").unwrap()
    );
}

#[test]
fn exporte_le_graphique_svg() {
    let statement = load_fixture("balance_2023.csv");
    let out = std::env::temp_dir().join("caf_report_chart_test.svg");
    BarChart::from_figures(&statement.figures, &statement.meta.devise)
        .render_to(&out)
        .expect("render svg");
    let rendered = std::fs::read_to_string(&out).expect("read svg");
    assert!(rendered.contains("<svg"));
    assert!(rendered.contains("Autofinancement"));
    let _ = std::fs::remove_file(out);
}

#[test]
fn exporte_le_rapport_pdf() {
    let statement = load_fixture("tcr_2022.csv");
    let out = std::env::temp_dir().join("caf_report_pdf_test.pdf");
    PdfReport::new(&statement).save(&out).expect("save pdf");
    let bytes = std::fs::read(&out).expect("read pdf");
    assert!(bytes.starts_with(b"%PDF"));
    let _ = std::fs::remove_file(out);
}
