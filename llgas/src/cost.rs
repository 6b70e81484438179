//! Weighted cost ("gas") estimate.
use enum_map::{EnumMap, enum_map};
use strum::IntoEnumIterator;

use crate::category::{Category, Histogram};

/// Weight table `Category -> units`.
///
/// The estimate is a proxy for computational expense, not a measured cost.
/// Defaults: add/sub cost 1, mul/div cost 5, call/load/store cost 10.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostModel {
    weights: EnumMap<Category, u64>,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            weights: enum_map! {
                Category::Add | Category::Sub => 1,
                Category::Mul | Category::Div => 5,
                Category::Call | Category::Load | Category::Store => 10,
            },
        }
    }
}

impl CostModel {
    #[inline]
    pub fn weight(&self, category: Category) -> u64 {
        self.weights[category]
    }

    pub fn with_weight(mut self, category: Category, weight: u64) -> Self {
        self.weights[category] = weight;
        self
    }

    /// Weighted sum of the histogram counts.
    pub fn estimate(&self, histogram: &Histogram) -> u64 {
        histogram
            .iter()
            .map(|(category, count)| count.saturating_mul(self.weights[category]))
            .fold(0, u64::saturating_add)
    }

    /// Render the table with consecutive categories of equal weight merged,
    /// e.g. `add/sub=1, mul/div=5, call/load/store=10`.
    pub fn legend(&self) -> String {
        let mut groups: Vec<(Vec<Category>, u64)> = Vec::new();
        for category in Category::iter() {
            let weight = self.weights[category];
            match groups.last_mut() {
                Some((members, w)) if *w == weight => members.push(category),
                _ => groups.push((vec![category], weight)),
            }
        }

        groups
            .iter()
            .map(|(members, weight)| {
                let names: Vec<String> = members.iter().map(ToString::to_string).collect();
                format!("{}={}", names.join("/"), weight)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
