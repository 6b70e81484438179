//! Opcode categories tracked by the analyzer.
//!
//! The mapping from [`Opcode`] to [`Category`] is an explicit table rather
//! than a `match` in the traversal, so the policy can be inspected and
//! extended (floating point, SIMD, ...) without touching the analyzer.
use enum_map::{Enum, EnumMap, enum_map};
use llir::modules::instructions::Opcode;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Bucket an instruction is counted in. Opcodes outside every bucket only
/// contribute to a function's instruction total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Enum, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Add,
    Sub,
    Mul,
    /// Signed and unsigned integer division.
    Div,
    Call,
    Load,
    Store,
}

/// Lookup table `Opcode -> Option<Category>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    entries: EnumMap<Opcode, Option<Category>>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            entries: enum_map! {
                Opcode::Add => Some(Category::Add),
                Opcode::Sub => Some(Category::Sub),
                Opcode::Mul => Some(Category::Mul),
                Opcode::UDiv | Opcode::SDiv => Some(Category::Div),
                Opcode::Call => Some(Category::Call),
                Opcode::Load => Some(Category::Load),
                Opcode::Store => Some(Category::Store),
                _ => None,
            },
        }
    }
}

impl CategoryTable {
    /// A table in which no opcode is tracked.
    pub fn empty() -> Self {
        Self {
            entries: EnumMap::default(),
        }
    }

    #[inline]
    pub fn classify(&self, opcode: Opcode) -> Option<Category> {
        self.entries[opcode]
    }

    /// Override the category of `opcode`; `None` stops tracking it.
    pub fn assign(&mut self, opcode: Opcode, category: Option<Category>) -> &mut Self {
        self.entries[opcode] = category;
        self
    }

    /// Every opcode mapped to `category`, in declaration order.
    pub fn opcodes_of(&self, category: Category) -> impl Iterator<Item = Opcode> + '_ {
        Opcode::iter().filter(move |op| self.entries[*op] == Some(category))
    }
}

/// Per-category instruction counts of one function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: EnumMap<Category, u64>,
}

impl Histogram {
    pub fn record(&mut self, category: Category) {
        self.counts[category] += 1;
    }

    #[inline]
    pub fn count(&self, category: Category) -> u64 {
        self.counts[category]
    }

    /// Sum over all categories. Never exceeds the instruction total of the
    /// function the histogram was built from.
    pub fn tracked(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        self.counts.iter().map(|(category, count)| (category, *count))
    }
}

impl FromIterator<Category> for Histogram {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        let mut histogram = Histogram::default();
        for category in iter {
            histogram.record(category);
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_tracks_integer_arithmetic_and_memory() {
        let table = CategoryTable::default();
        assert_eq!(table.classify(Opcode::Add), Some(Category::Add));
        assert_eq!(table.classify(Opcode::UDiv), Some(Category::Div));
        assert_eq!(table.classify(Opcode::SDiv), Some(Category::Div));
        assert_eq!(table.classify(Opcode::Store), Some(Category::Store));

        for untracked in [Opcode::FAdd, Opcode::FDiv, Opcode::URem, Opcode::Ret, Opcode::Alloca] {
            assert_eq!(table.classify(untracked), None, "{untracked} should be untracked");
        }

        let tracked = Opcode::iter().filter(|op| table.classify(*op).is_some()).count();
        assert_eq!(tracked, 8);
    }

    #[test]
    fn assign_overrides_entries() {
        let mut table = CategoryTable::default();
        table
            .assign(Opcode::FMul, Some(Category::Mul))
            .assign(Opcode::Call, None);

        assert_eq!(table.classify(Opcode::FMul), Some(Category::Mul));
        assert_eq!(table.classify(Opcode::Call), None);
        assert_eq!(
            table.opcodes_of(Category::Mul).collect::<Vec<_>>(),
            [Opcode::Mul, Opcode::FMul]
        );
        assert_eq!(CategoryTable::empty().opcodes_of(Category::Add).count(), 0);
    }

    #[test]
    fn histogram_counts() {
        let histogram: Histogram = [Category::Load, Category::Load, Category::Call]
            .into_iter()
            .collect();
        assert_eq!(histogram.count(Category::Load), 2);
        assert_eq!(histogram.count(Category::Call), 1);
        assert_eq!(histogram.count(Category::Add), 0);
        assert_eq!(histogram.tracked(), 3);
        assert_eq!(Category::Store.to_string(), "store");
    }
}
