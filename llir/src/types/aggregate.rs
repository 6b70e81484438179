//! Aggregate types
//!
//! Composite types built from other [`Type`] values:
//! - `ArrayType`: a fixed-size array of elements.
//! - `StructType`: a literal (possibly packed) sequence of element types.
use crate::types::Type;

/// Array type
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArrayType {
    pub ty: Box<Type>,
    pub num_elements: u64,
}

impl std::fmt::Display for ArrayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} x {}]", self.num_elements, self.ty)
    }
}

/// Structure type
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StructType {
    pub element_types: Vec<Type>,
    pub packed: bool,
}

impl std::fmt::Display for StructType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.packed {
            write!(f, "<")?;
        }

        if self.element_types.is_empty() {
            write!(f, "{{}}")?;
        } else {
            write!(f, "{{ ")?;
            for (i, elem) in self.element_types.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", elem)?;
            }
            write!(f, " }}")?;
        }

        if self.packed {
            write!(f, ">")?;
        }
        Ok(())
    }
}
