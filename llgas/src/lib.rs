//! Per-function statistics and gas estimates for IR modules.
//!
//! A module is obtained through an [`llir::loader::ModuleLoader`], each of
//! its functions is run through the [`analysis::Analyzer`] and the results
//! are rendered by [`report::Report`]. Opcode categories and cost weights are
//! plain lookup tables ([`category::CategoryTable`], [`cost::CostModel`]).
use std::path::Path;

use llir::{loader::ModuleLoader, utils::Error};
use log::info;

use crate::{analysis::Analyzer, report::Report};

pub mod analysis;
pub mod category;
pub mod cost;
pub mod report;

/// Load the module at `path`, analyze every function with the default
/// tables and return the rendered report.
///
/// Any loader failure is returned as is; no partial report is produced.
pub fn run<L: ModuleLoader>(loader: L, path: &Path) -> Result<String, Error> {
    run_with(loader, path, &Analyzer::default())
}

/// Same as [`run`] with a caller-provided analyzer.
pub fn run_with<L: ModuleLoader>(
    loader: L,
    path: &Path,
    analyzer: &Analyzer,
) -> Result<String, Error> {
    let module = loader.load(path)?;
    info!(
        "analyzing `{}` ({} function(s)) loaded by {}",
        module.name,
        module.functions.len(),
        loader.name()
    );

    let results = analyzer.analyze_module(&module);
    Ok(Report::new(&module, &results, analyzer.cost_model()).to_string())
}
