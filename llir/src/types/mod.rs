//! Types module
//!
//! This module contains the representation of types as they appear in
//! textual IR. Types are plain values: composite types own their element
//! types, so a [`Type`] can be cloned, compared and printed without any
//! side table.
//!
//! - Primary types: integers, floating points, pointers and vectors (see `primary.rs`).
//! - Aggregate types: arrays and literal structures (see `aggregate.rs`).
//!
//! [`Type`] implements `Display` and prints exactly the spelling LLVM uses,
//! which is what reports show as a function's return type.
use strum::{EnumIs, EnumTryAs};

use crate::types::{
    aggregate::{ArrayType, StructType},
    primary::{FType, IType, PtrType, VcType},
};

pub mod aggregate;
pub mod primary;

/// Any type that can appear in a function signature or instruction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumTryAs)]
pub enum Type {
    /// The absence of a value; only valid as a return type.
    Void,
    Int(IType),
    Float(FType),
    Ptr(PtrType),
    Vector(VcType),
    Array(ArrayType),
    Struct(StructType),

    /// Reference to an identified structure (e.g. `%struct.Point`).
    Named(String),

    /// Pre-opaque-pointer typed pointer (e.g. `i8*`).
    TypedPtr(Box<Type>),

    Label,
    Metadata,
    Token,
    X86Amx,
}

/// Characters allowed in an unquoted `@`/`%` name.
pub(crate) fn is_ident_char(c: &char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '$' | '.' | '_')
}

impl From<IType> for Type {
    fn from(ty: IType) -> Self {
        Type::Int(ty)
    }
}

impl From<FType> for Type {
    fn from(ty: FType) -> Self {
        Type::Float(ty)
    }
}

impl From<PtrType> for Type {
    fn from(ty: PtrType) -> Self {
        Type::Ptr(ty)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int(ty) => ty.fmt(f),
            Type::Float(ty) => ty.fmt(f),
            Type::Ptr(ty) => ty.fmt(f),
            Type::Vector(ty) => ty.fmt(f),
            Type::Array(ty) => ty.fmt(f),
            Type::Struct(ty) => ty.fmt(f),
            Type::Named(name) if !name.is_empty() && name.chars().all(|c| is_ident_char(&c)) => {
                write!(f, "%{}", name)
            }
            Type::Named(name) => write!(f, "%\"{}\"", name),
            Type::TypedPtr(pointee) => write!(f, "{}*", pointee),
            Type::Label => write!(f, "label"),
            Type::Metadata => write!(f, "metadata"),
            Type::Token => write!(f, "token"),
            Type::X86Amx => write!(f, "x86_amx"),
        }
    }
}
