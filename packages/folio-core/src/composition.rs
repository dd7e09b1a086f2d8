//! Category composition of a total value.

use crate::types::{CompositionItem, CompositionShare};
use std::collections::HashMap;

/// Break a set of categorized values into percentage shares.
///
/// Items sharing a category are merged, keeping first-seen order.
/// Percentages are full precision; rounding is left to the display layer.
/// A zero total gives every category a 0% share.
pub fn summarize(items: &[CompositionItem]) -> Vec<CompositionShare> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut shares: Vec<CompositionShare> = Vec::new();

    for item in items {
        match index.get(item.category.as_str()) {
            Some(&slot) => shares[slot].value += item.value,
            None => {
                index.insert(item.category.as_str(), shares.len());
                shares.push(CompositionShare {
                    category: item.category.clone(),
                    value: item.value,
                    percentage: 0.0,
                });
            }
        }
    }

    let total: f64 = shares.iter().map(|s| s.value).sum();
    if total != 0.0 {
        for share in &mut shares {
            share.percentage = share.value / total * 100.0;
        }
    }

    tracing::debug!(categories = shares.len(), total, "summarized composition");
    shares
}
