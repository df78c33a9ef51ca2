#![warn(missing_docs)]
//! Bibliothèque de calcul de la capacité d'autofinancement (CAF) à partir
//! de balances comptables importées de fichiers CSV ou tableur.

mod balance;
mod chart;
mod classify;
mod error;
mod pdf;
mod statement;
mod statement_set;
mod types;
mod utils;

pub use crate::balance::{Balance, DEVISE_DEFAUT};
pub use crate::chart::BarChart;
pub use crate::classify::{categorize, classify_line};
pub use crate::error::CafError;
pub use crate::pdf::PdfReport;
pub use crate::statement::{CafStatement, CafStatementBuilder};
pub use crate::statement_set::{CafSet, ExerciceCaf};
pub use crate::types::*;
pub use crate::utils::format_montant;
