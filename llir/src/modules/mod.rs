//! Module, function and basic block containers
//!
//! A [`Module`] is the result of reading one textual IR file. It owns its
//! functions in the order they appear in the source; each [`Function`] owns
//! its basic blocks and each [`BasicBlock`] its instructions. Nothing here is
//! shared or reference counted: the whole tree is a plain value that callers
//! traverse by reference.
use crate::{modules::instructions::Instruction, types::Type};

pub mod instructions;
#[cfg(feature = "chumsky")]
pub mod parser;

/// A straight-line sequence of instructions ending with a terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BasicBlock {
    /// Label of the block, without the trailing `:`. The entry block may be
    /// left unlabeled in the source.
    pub label: Option<String>,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(label: Option<String>) -> Self {
        Self {
            label,
            instructions: Vec::new(),
        }
    }

    /// Returns the last instruction if it ends the block.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions
            .last()
            .filter(|instr| instr.opcode.is_terminator())
    }
}

/// A formal parameter of a function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub ty: Type,
    /// Name of the parameter (without `%`) when the source gives one.
    pub name: Option<String>,
}

impl Param {
    pub fn new(ty: Type) -> Self {
        Self { ty, name: None }
    }
}

/// A function made of basic blocks and parameter metadata.
///
/// A function without basic blocks is a declaration: its body lives in
/// another module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    /// `true` when the parameter list ends with `...`.
    pub variadic: bool,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            return_type,
            params: Vec::new(),
            variadic: false,
            blocks: Vec::new(),
        }
    }

    /// Number of declared parameters. The variadic tail is not counted.
    #[inline]
    pub fn arg_count(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over every instruction, block by block, in storage order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|bb| bb.instructions.iter())
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|bb| bb.instructions.len()).sum()
    }
}

/// A compilation unit: an ordered list of functions plus identification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Module {
    /// Module identifier; the path the module was read from.
    pub name: String,
    /// Value of the `source_filename` directive, or the module identifier
    /// when the directive is absent.
    pub source_file_name: String,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_file_name: name.clone(),
            name,
            functions: Vec::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|func| func.name == name)
    }
}
