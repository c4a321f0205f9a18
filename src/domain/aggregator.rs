//! Price totals over checked services

use crate::domain::entities::{ChangeSet, NodeId, Price};
use crate::domain::tree::ServiceTree;

/// Read-only price queries over a `ServiceTree`.
pub struct Aggregator;

impl Aggregator {
    /// Sum of prices of all checked nodes, zero when nothing is checked.
    ///
    /// The builder rejects trees whose grand total overflows, so the
    /// saturating add never saturates in practice.
    pub fn total(tree: &ServiceTree) -> Price {
        tree.checked()
            .iter()
            .fold(Price::ZERO, |acc, n| acc.saturating_add(n.price()))
    }

    /// Checked total of `id` and its descendants.
    pub fn subtotal(tree: &ServiceTree, id: NodeId) -> Price {
        let Some(root) = tree.get(id) else {
            return Price::ZERO;
        };
        std::iter::once(root)
            .chain(tree.descendants(id))
            .filter(|n| n.is_checked())
            .fold(Price::ZERO, |acc, n| acc.saturating_add(n.price()))
    }

    /// Signed change of the total (minor units) implied by `changes`.
    pub fn delta(tree: &ServiceTree, changes: &ChangeSet) -> i128 {
        changes
            .iter()
            .filter_map(|c| {
                tree.get(c.id).map(|n| {
                    let minor = i128::from(n.price().minor());
                    if c.checked {
                        minor
                    } else {
                        -minor
                    }
                })
            })
            .sum()
    }
}
