use strum::{EnumIs, EnumIter, EnumTryAs};

use crate::types::Type;

/// Represents an integer type with a specific bit width.
///
/// Signedness is not represented here; instructions that operate on signed
/// integers interpret the bits accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct IType {
    num_bits: u32,
}

impl IType {
    /// Common integer types.
    pub const I1: Self = Self { num_bits: 1 };
    pub const I8: Self = Self { num_bits: 8 };
    pub const I16: Self = Self { num_bits: 16 };
    pub const I32: Self = Self { num_bits: 32 };
    pub const I64: Self = Self { num_bits: 64 };
    pub const I128: Self = Self { num_bits: 128 };
    pub const MIN_BITS: u32 = 1;
    pub const MAX_BITS: u32 = (1 << 23) - 1;

    /// Creates a new `IType` with the specified number of bits, or `None` if
    /// the width is outside `MIN_BITS..=MAX_BITS`.
    #[inline]
    pub const fn new(num_bits: u32) -> Option<Self> {
        if num_bits >= Self::MIN_BITS && num_bits <= Self::MAX_BITS {
            Some(Self { num_bits })
        } else {
            None
        }
    }

    #[inline]
    pub const fn num_bits(&self) -> u32 {
        self.num_bits
    }
}

impl std::fmt::Display for IType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "i{}", self.num_bits)
    }
}

/// Represents a floating-point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum FType {
    /// 16-bit floating point value (IEEE-754 binary16)
    Half,

    /// 16-bit "brain" floating point value (7-bit significand).
    BFloat,

    /// 32-bit floating point value (IEEE-754 binary32)
    Float,

    /// 64-bit floating point value (IEEE-754 binary64)
    Double,

    /// 128-bit floating point value (IEEE-754 binary128)
    Fp128,

    /// 80-bit floating point value (X87 extended precision)
    X86Fp80,

    /// 128-bit floating point value (two 64-bit values)
    PPCFp128,
}

impl FType {
    /// Keyword used for this type in textual IR.
    pub fn keyword(&self) -> &'static str {
        match self {
            FType::Half => "half",
            FType::BFloat => "bfloat",
            FType::Float => "float",
            FType::Double => "double",
            FType::Fp128 => "fp128",
            FType::X86Fp80 => "x86_fp80",
            FType::PPCFp128 => "ppc_fp128",
        }
    }
}

impl std::fmt::Display for FType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Pointer type.
///
/// Pointers are opaque and carry only the address space they point into.
/// Address space zero is the default and is not printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PtrType {
    pub addrspace: u32,
}

impl std::fmt::Display for PtrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.addrspace == 0 {
            write!(f, "ptr")
        } else {
            write!(f, "ptr addrspace({})", self.addrspace)
        }
    }
}

/// Size of a vector type, either fixed or scalable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumTryAs)]
pub enum VectorSize {
    /// Fixed size vector with the given number of elements.
    Fixed(u32),

    /// Scalable size vector where number of elements is a multiple of the given factor.
    Scalable(u32),
}

/// A vector of primitive elements operated on in parallel (SIMD).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VcType {
    pub ty: Box<Type>,
    pub size: VectorSize,
}

impl std::fmt::Display for VcType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.size {
            VectorSize::Fixed(num) => write!(f, "<{} x {}>", num, self.ty),
            VectorSize::Scalable(num) => write!(f, "<vscale x {} x {}>", num, self.ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn itype_rejects_out_of_range_widths() {
        assert_eq!(IType::new(0), None);
        assert_eq!(IType::new(IType::MAX_BITS + 1), None);
        assert_eq!(IType::new(32), Some(IType::I32));
        assert_eq!(IType::new(IType::MAX_BITS).map(|ty| ty.num_bits()), Some(IType::MAX_BITS));
        assert_eq!(IType::I1.to_string(), "i1");
    }

    #[test]
    fn ftype_keywords_are_distinct() {
        let mut keywords: Vec<_> = FType::iter().map(|ty| ty.keyword()).collect();
        keywords.sort();
        keywords.dedup();
        assert_eq!(keywords.len(), FType::iter().count());
    }

    #[test]
    fn pointer_prints_non_default_address_space() {
        assert_eq!(PtrType::default().to_string(), "ptr");
        assert_eq!(PtrType { addrspace: 3 }.to_string(), "ptr addrspace(3)");
    }

    #[test]
    fn vector_formats_like_llvm() {
        let fixed = VcType {
            ty: Box::new(Type::Float(FType::Float)),
            size: VectorSize::Fixed(4),
        };
        let scalable = VcType {
            ty: Box::new(Type::Int(IType::I32)),
            size: VectorSize::Scalable(2),
        };
        assert_eq!(fixed.to_string(), "<4 x float>");
        assert_eq!(scalable.to_string(), "<vscale x 2 x i32>");
    }
}
