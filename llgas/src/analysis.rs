//! Per-function analysis.
//!
//! [`Analyzer::analyze`] walks every instruction of a function once, block by
//! block, and derives structural metrics, a category histogram, the weighted
//! cost and a few presentation-only advisories. Analysis is total: any
//! [`Function`] the loader produces can be analyzed.
use bitflags::bitflags;
use llir::modules::{Function, Module};
use log::debug;
use strum::EnumIs;

use crate::{
    category::{Category, CategoryTable, Histogram},
    cost::CostModel,
};

bitflags! {
    /// Advisory notes attached to a function. They carry no enforcement.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct Advisories: u8 {
        /// The function is small enough to be worth inlining.
        const INLINE_CANDIDATE = 1 << 0;

        /// The function has enough basic blocks for branching to matter.
        const BRANCH_COMPLEXITY = 1 << 1;
    }
}

/// Limits deciding which [`Advisories`] are raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Inline candidates have at least one and fewer than this many
    /// instructions.
    pub inline_below: usize,
    /// Branch complexity is noted above this many basic blocks.
    pub branchy_above: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            inline_below: 5,
            branchy_above: 3,
        }
    }
}

impl Thresholds {
    pub fn advise(&self, instruction_total: usize, block_count: usize) -> Advisories {
        let mut advisories = Advisories::empty();
        advisories.set(
            Advisories::INLINE_CANDIDATE,
            instruction_total > 0 && instruction_total < self.inline_below,
        );
        advisories.set(
            Advisories::BRANCH_COMPLEXITY,
            block_count > self.branchy_above,
        );
        advisories
    }
}

/// Name/behavior mismatch found by a string-literal heuristic.
///
/// Only functions named exactly `add` or `multiply` are checked. This is a
/// pattern match on the name, not semantic analysis, and says nothing about
/// functions named any other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum NameMismatch {
    /// `add` multiplies but never adds.
    AddWithoutAdd,
    /// `multiply` adds but never multiplies.
    MultiplyWithoutMul,
}

impl NameMismatch {
    pub fn detect(name: &str, histogram: &Histogram) -> Option<Self> {
        let adds = histogram.count(Category::Add);
        let muls = histogram.count(Category::Mul);

        match name {
            "add" if muls > 0 && adds == 0 => Some(Self::AddWithoutAdd),
            "multiply" if adds > 0 && muls == 0 => Some(Self::MultiplyWithoutMul),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::AddWithoutAdd => {
                "Function named 'add' contains mul instructions but no add instructions!"
            }
            Self::MultiplyWithoutMul => {
                "Function named 'multiply' contains add instructions but no mul instructions!"
            }
        }
    }
}

/// Result of analyzing one function. Built once by [`Analyzer::analyze`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAnalysis {
    name: String,
    return_type: String,
    argument_count: usize,
    basic_block_count: usize,
    instruction_total: usize,
    histogram: Histogram,
    mismatch: Option<NameMismatch>,
    cost: u64,
    advisories: Advisories,
}

impl FunctionAnalysis {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return type in textual IR spelling.
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn argument_count(&self) -> usize {
        self.argument_count
    }

    pub fn basic_block_count(&self) -> usize {
        self.basic_block_count
    }

    /// Number of instructions, tracked or not.
    pub fn instruction_total(&self) -> usize {
        self.instruction_total
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn mismatch(&self) -> Option<NameMismatch> {
        self.mismatch
    }

    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn advisories(&self) -> Advisories {
        self.advisories
    }
}

/// Function analyzer holding the category table, the weight table and the
/// advisory thresholds.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    table: CategoryTable,
    cost_model: CostModel,
    thresholds: Thresholds,
}

impl Analyzer {
    pub fn new(table: CategoryTable, cost_model: CostModel, thresholds: Thresholds) -> Self {
        Self {
            table,
            cost_model,
            thresholds,
        }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn analyze(&self, function: &Function) -> FunctionAnalysis {
        let mut histogram = Histogram::default();
        let mut instruction_total = 0;

        for instr in function.instructions() {
            instruction_total += 1;
            if let Some(category) = self.table.classify(instr.opcode) {
                histogram.record(category);
            }
        }

        let basic_block_count = function.blocks.len();
        let mismatch = NameMismatch::detect(&function.name, &histogram);
        let cost = self.cost_model.estimate(&histogram);
        let advisories = self.thresholds.advise(instruction_total, basic_block_count);

        debug!(
            "analyzed `{}`: {} instruction(s), {} tracked, cost {}",
            function.name,
            instruction_total,
            histogram.tracked(),
            cost
        );

        FunctionAnalysis {
            name: function.name.clone(),
            return_type: function.return_type.to_string(),
            argument_count: function.arg_count(),
            basic_block_count,
            instruction_total,
            histogram,
            mismatch,
            cost,
            advisories,
        }
    }

    /// Analyze every function of `module`, in module order.
    pub fn analyze_module(&self, module: &Module) -> Vec<FunctionAnalysis> {
        module.functions.iter().map(|func| self.analyze(func)).collect()
    }
}

#[cfg(test)]
mod tests {
    use llir::{
        modules::{
            BasicBlock, Param,
            instructions::{Instruction, Opcode},
        },
        types::{Type, primary::IType},
    };

    use super::*;

    fn function(name: &str, blocks: &[&[Opcode]]) -> Function {
        let mut func = Function::new(name, IType::I32.into());
        for opcodes in blocks {
            let mut block = BasicBlock::new(None);
            block.instructions = opcodes.iter().copied().map(Instruction::new).collect();
            func.blocks.push(block);
        }
        func
    }

    fn histogram(adds: usize, muls: usize) -> Histogram {
        std::iter::repeat_n(Category::Add, adds)
            .chain(std::iter::repeat_n(Category::Mul, muls))
            .collect()
    }

    #[test]
    fn mismatch_truth_table() {
        for (name, adds, muls, expected) in [
            ("add", 0, 1, Some(NameMismatch::AddWithoutAdd)),
            ("add", 0, 3, Some(NameMismatch::AddWithoutAdd)),
            ("add", 1, 1, None),
            ("add", 0, 0, None),
            ("add", 2, 0, None),
            ("multiply", 1, 0, Some(NameMismatch::MultiplyWithoutMul)),
            ("multiply", 1, 1, None),
            ("multiply", 0, 0, None),
            ("multiply", 0, 2, None),
            ("Add", 0, 1, None),
            ("add_numbers", 0, 1, None),
            ("mul", 1, 0, None),
        ] {
            assert_eq!(
                NameMismatch::detect(name, &histogram(adds, muls)),
                expected,
                "name={name} adds={adds} muls={muls}"
            );
        }
    }

    #[test]
    fn mismatch_ignores_division() {
        let histogram: Histogram = [Category::Div].into_iter().collect();
        assert_eq!(NameMismatch::detect("add", &histogram), None);
    }

    #[test]
    fn advisory_thresholds() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.advise(0, 0), Advisories::empty());
        assert_eq!(thresholds.advise(1, 1), Advisories::INLINE_CANDIDATE);
        assert_eq!(thresholds.advise(4, 3), Advisories::INLINE_CANDIDATE);
        assert_eq!(thresholds.advise(5, 3), Advisories::empty());
        assert_eq!(thresholds.advise(12, 4), Advisories::BRANCH_COMPLEXITY);
        assert_eq!(
            thresholds.advise(2, 9),
            Advisories::INLINE_CANDIDATE | Advisories::BRANCH_COMPLEXITY
        );
    }

    #[test]
    fn analyze_counts_every_instruction() {
        let func = function(
            "mixed",
            &[
                &[Opcode::Alloca, Opcode::Load, Opcode::Add, Opcode::Br],
                &[Opcode::FAdd, Opcode::SDiv, Opcode::UDiv, Opcode::Ret],
            ],
        );
        let result = Analyzer::default().analyze(&func);

        assert_eq!(result.instruction_total(), 8);
        assert_eq!(result.basic_block_count(), 2);
        assert_eq!(result.histogram().count(Category::Div), 2);
        assert_eq!(result.histogram().count(Category::Add), 1);
        assert_eq!(result.histogram().tracked(), 4);
        assert!(result.histogram().tracked() <= result.instruction_total() as u64);
        assert_eq!(result.cost(), 10 + 1 + 5 + 5);
        assert_eq!(result.advisories(), Advisories::empty());
        assert_eq!(result.mismatch(), None);
    }

    #[test]
    fn analyze_reports_signature() {
        let mut func = function("f", &[&[Opcode::Ret]]);
        func.return_type = Type::Void;
        func.params.push(Param::new(IType::I64.into()));
        func.params.push(Param::new(IType::I8.into()));

        let result = Analyzer::default().analyze(&func);
        assert_eq!(result.name(), "f");
        assert_eq!(result.return_type(), "void");
        assert_eq!(result.argument_count(), 2);
    }

    #[test]
    fn cost_ignores_instruction_order() {
        let forward = function("f", &[&[Opcode::Mul, Opcode::Call, Opcode::Store, Opcode::Ret]]);
        let backward = function("f", &[&[Opcode::Store, Opcode::Call, Opcode::Mul, Opcode::Ret]]);
        let analyzer = Analyzer::default();

        let a = analyzer.analyze(&forward);
        assert_eq!(a, analyzer.analyze(&forward));
        assert_eq!(a.cost(), analyzer.analyze(&backward).cost());
        assert_eq!(a.cost(), 25);
    }

    #[test]
    fn custom_tables_change_the_estimate() {
        let mut table = CategoryTable::default();
        table.assign(Opcode::FMul, Some(Category::Mul));
        let analyzer = Analyzer::new(
            table,
            CostModel::default().with_weight(Category::Mul, 7),
            Thresholds {
                inline_below: 2,
                branchy_above: 0,
            },
        );

        assert_eq!(analyzer.table().classify(Opcode::FMul), Some(Category::Mul));
        assert_eq!(analyzer.thresholds().inline_below, 2);
        assert_eq!(analyzer.cost_model().weight(Category::Mul), 7);

        let result = analyzer.analyze(&function("f", &[&[Opcode::FMul, Opcode::Ret]]));
        assert_eq!(result.cost(), 7);
        assert_eq!(result.advisories(), Advisories::BRANCH_COMPLEXITY);
    }
}
