//! Erreurs d'import et de calcul des balances.

/// Erreur d'import d'une balance ou de génération d'un rapport.
#[derive(thiserror::Error, Debug)]
pub enum CafError {
    /// Erreur d'entrée-sortie à la lecture du fichier source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Erreur de lecture du CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Erreur d'ouverture ou de lecture du classeur tableur.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    /// Le classeur ne contient aucune feuille.
    #[error("Workbook has no worksheet")]
    EmptyWorkbook,
    /// Colonne obligatoire introuvable dans l'en-tête.
    #[error("Required column '{column}' not found")]
    MissingColumn {
        /// Nom de la colonne attendue.
        column: &'static str,
    },
    /// Valeur numérique illisible.
    #[error("Invalid number '{value}' in column '{column}'")]
    Number {
        /// Valeur source incorrecte.
        value: String,
        /// Nom de la colonne.
        column: &'static str,
    },
    /// Extension de fichier non gérée.
    #[error("Unsupported file extension '{extension}'")]
    UnsupportedExtension {
        /// Extension rencontrée.
        extension: String,
    },
    /// Échec de génération du document PDF.
    #[error("PDF generation error: {0}")]
    Pdf(String),
}
