use enum_map::Enum;
use strum::{Display, EnumIs, EnumIter, EnumString, IntoStaticStr};

/// Every instruction opcode understood by the textual reader.
///
/// The string form of each variant is the mnemonic used in textual IR
/// (`add`, `getelementptr`, `va_arg`, ...). `Opcode::from_str` parses a
/// mnemonic and `Opcode::iter()` enumerates the whole set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Enum,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum Opcode {
    // Terminators
    Ret,
    Br,
    Switch,
    IndirectBr,
    Invoke,
    Resume,
    Unreachable,
    CleanupRet,
    CatchRet,
    CatchSwitch,
    CallBr,

    // Unary
    FNeg,

    // Binary
    Add,
    FAdd,
    Sub,
    FSub,
    Mul,
    FMul,
    UDiv,
    SDiv,
    FDiv,
    URem,
    SRem,
    FRem,

    // Bitwise
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,

    // Vector
    ExtractElement,
    InsertElement,
    ShuffleVector,

    // Aggregate
    ExtractValue,
    InsertValue,

    // Memory
    Alloca,
    Load,
    Store,
    Fence,
    CmpXchg,
    AtomicRMW,
    GetElementPtr,

    // Conversions
    Trunc,
    ZExt,
    SExt,
    FPToUI,
    FPToSI,
    UIToFP,
    SIToFP,
    FPTrunc,
    FPExt,
    PtrToInt,
    IntToPtr,
    BitCast,
    AddrSpaceCast,

    // Other
    ICmp,
    FCmp,
    Phi,
    Select,
    Freeze,
    Call,
    #[strum(serialize = "va_arg")]
    VAArg,
    LandingPad,
    CatchPad,
    CleanupPad,
}

/// Broad family an [`Opcode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs, Display)]
pub enum OpcodeClass {
    Terminator,
    Unary,
    Binary,
    Bitwise,
    Vector,
    Aggregate,
    Memory,
    Cast,
    Other,
}

impl Opcode {
    /// Return the mnemonic used when printing this opcode.
    pub fn opname(&self) -> &'static str {
        self.into()
    }

    pub fn class(&self) -> OpcodeClass {
        use Opcode::*;

        match self {
            Ret | Br | Switch | IndirectBr | Invoke | Resume | Unreachable | CleanupRet
            | CatchRet | CatchSwitch | CallBr => OpcodeClass::Terminator,
            FNeg => OpcodeClass::Unary,
            Add | FAdd | Sub | FSub | Mul | FMul | UDiv | SDiv | FDiv | URem | SRem | FRem => {
                OpcodeClass::Binary
            }
            Shl | LShr | AShr | And | Or | Xor => OpcodeClass::Bitwise,
            ExtractElement | InsertElement | ShuffleVector => OpcodeClass::Vector,
            ExtractValue | InsertValue => OpcodeClass::Aggregate,
            Alloca | Load | Store | Fence | CmpXchg | AtomicRMW | GetElementPtr => {
                OpcodeClass::Memory
            }
            Trunc | ZExt | SExt | FPToUI | FPToSI | UIToFP | SIToFP | FPTrunc | FPExt
            | PtrToInt | IntToPtr | BitCast | AddrSpaceCast => OpcodeClass::Cast,
            ICmp | FCmp | Phi | Select | Freeze | Call | VAArg | LandingPad | CatchPad
            | CleanupPad => OpcodeClass::Other,
        }
    }

    /// Returns `true` if this opcode ends a basic block.
    #[inline]
    pub fn is_terminator(&self) -> bool {
        self.class().is_terminator()
    }
}

/// A single instruction of a basic block.
///
/// Only the opcode is interpreted; operands are kept verbatim (trimmed) so
/// that the instruction can be printed back or inspected by callers that
/// need more than the opcode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// Destination register name, without the `%` sigil.
    pub dest: Option<String>,
    pub opcode: Opcode,
    pub operands: String,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            dest: None,
            opcode,
            operands: String::new(),
        }
    }

    pub fn with_dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn with_operands(mut self, operands: impl Into<String>) -> Self {
        self.operands = operands.into();
        self
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(dest) = &self.dest {
            write!(f, "%{} = ", dest)?;
        }
        write!(f, "{}", self.opcode)?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn mnemonics_round_trip() {
        for op in Opcode::iter() {
            assert_eq!(Opcode::from_str(op.opname()), Ok(op), "opcode {op:?}");
        }
        assert_eq!(Opcode::GetElementPtr.opname(), "getelementptr");
        assert_eq!(Opcode::VAArg.opname(), "va_arg");
        assert_eq!(Opcode::AtomicRMW.opname(), "atomicrmw");
        assert!(Opcode::from_str("iadd").is_err());
    }

    #[test]
    fn terminators_are_classified() {
        let terminators: Vec<_> = Opcode::iter().filter(Opcode::is_terminator).collect();
        assert_eq!(terminators.len(), 11);
        assert!(Opcode::Ret.is_terminator());
        assert!(!Opcode::Call.is_terminator());
        assert_eq!(Opcode::UDiv.class(), OpcodeClass::Binary);
        assert_eq!(Opcode::Store.class(), OpcodeClass::Memory);
    }

    #[test]
    fn instruction_display() {
        let instr = Instruction::new(Opcode::Add)
            .with_dest("sum")
            .with_operands("i32 %a, %b");
        assert_eq!(instr.to_string(), "%sum = add i32 %a, %b");
        assert_eq!(Instruction::new(Opcode::Unreachable).to_string(), "unreachable");
    }
}
