use std::fmt;

use llir::modules::Module;

use crate::{
    analysis::{Advisories, FunctionAnalysis},
    cost::CostModel,
};

const BANNER: &str = "========================================";

/// Human-readable report over one module.
///
/// `results` must be in module order; functions are numbered from 1.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub module: &'a Module,
    pub results: &'a [FunctionAnalysis],
    pub cost_model: &'a CostModel,
}

impl<'a> Report<'a> {
    pub fn new(module: &'a Module, results: &'a [FunctionAnalysis], cost_model: &'a CostModel) -> Self {
        Self {
            module,
            results,
            cost_model,
        }
    }

    fn fmt_function(
        &self,
        f: &mut fmt::Formatter<'_>,
        index: usize,
        result: &FunctionAnalysis,
    ) -> fmt::Result {
        writeln!(f, "{}. Function Name: {}", index, result.name())?;
        writeln!(f, "   - Return Type: {}", result.return_type())?;
        writeln!(f, "   - Number of Arguments: {}", result.argument_count())?;
        writeln!(f, "   - Number of Basic Blocks: {}", result.basic_block_count())?;
        writeln!(f, "   - Number of Instructions: {}", result.instruction_total())?;

        if let Some(mismatch) = result.mismatch() {
            writeln!(f, "   [WARNING] HEURISTIC: Possible Logic Mismatch")?;
            writeln!(f, "       {}", mismatch.message())?;
        }

        writeln!(
            f,
            "   [GAS ESTIMATE] Total Estimated Gas Cost: {} units",
            result.cost()
        )?;
        writeln!(f, "       ({})", self.cost_model.legend())?;

        let advisories = result.advisories();
        if advisories.contains(Advisories::INLINE_CANDIDATE) {
            writeln!(f, "   [AOT TIP] Optimization: Suggest Inlining")?;
            writeln!(
                f,
                "       (Function has only {} instructions)",
                result.instruction_total()
            )?;
        }
        if advisories.contains(Advisories::BRANCH_COMPLEXITY) {
            writeln!(f, "   [COMPLEXITY] Note: Monitor for Branching overhead")?;
            writeln!(
                f,
                "       (Function has {} basic blocks)",
                result.basic_block_count()
            )?;
        }

        writeln!(f)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BANNER}")?;
        writeln!(f, "IR Module Gas Report")?;
        writeln!(f, "{BANNER}")?;
        writeln!(f, "Module: {}", self.module.name)?;
        writeln!(f, "Source File: {}", self.module.source_file_name)?;
        writeln!(f, "{BANNER}")?;
        writeln!(f, "Functions found in the module:")?;
        writeln!(f, "{BANNER}")?;

        for (i, result) in self.results.iter().enumerate() {
            self.fmt_function(f, i + 1, result)?;
        }

        writeln!(f, "{BANNER}")?;
        writeln!(f, "Total Functions: {}", self.results.len())?;
        writeln!(f, "{BANNER}")
    }
}
