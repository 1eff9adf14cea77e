pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod models;
pub mod planning;
pub mod report;
pub mod validation;

pub use error::{Error, Result};
pub use evaluator::TokenEvaluator;
pub use report::EvaluationReport;
