//! Property tests for checked-state propagation over random toggle sequences

use std::collections::HashSet;

use rstest::{fixture, rstest};

use svcpick::domain::{Aggregator, NodeId, Price, ServiceDescriptor, ServiceTree};
use svcpick::util::testing::sample_tree;

/// Small deterministic generator, enough to vary toggle sequences.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn pick(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

/// Four levels, fan-out 3, 40 nodes. Prices are 1..=40 cents.
#[fixture]
fn deep_tree() -> ServiceTree {
    let mut descriptors = vec![ServiceDescriptor::new("n0", Price::from_minor(1)).with_id(0)];
    let mut next = 1;
    let mut frontier = vec![0u32];
    for _ in 0..3 {
        let mut new_frontier = Vec::new();
        for parent in frontier {
            for _ in 0..3 {
                descriptors.push(
                    ServiceDescriptor::new(format!("n{}", next), Price::from_minor(next as u64 + 1))
                        .with_id(next)
                        .with_parent(parent),
                );
                new_frontier.push(next);
                next += 1;
            }
        }
        frontier = new_frontier;
    }
    ServiceTree::from_descriptors(descriptors).unwrap()
}

fn all_ids(tree: &ServiceTree) -> Vec<NodeId> {
    tree.iter().map(|n| n.id()).collect()
}

fn snapshot(tree: &ServiceTree) -> Vec<bool> {
    tree.iter().map(|n| n.is_checked()).collect()
}

fn assert_upward_closed(tree: &ServiceTree) {
    for node in tree.checked() {
        if let Some(parent) = tree.parent(node.id()) {
            assert!(
                parent.is_checked(),
                "{} is checked but parent {} is not",
                node.id(),
                parent.id()
            );
        }
    }
}

fn manual_total(tree: &ServiceTree) -> u64 {
    tree.iter()
        .filter(|n| n.is_checked())
        .map(|n| n.price().minor())
        .sum()
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(42)]
#[case(2024)]
fn given_random_toggles_when_applied_then_invariants_hold(
    deep_tree: ServiceTree,
    #[case] seed: u64,
) {
    let mut tree = deep_tree;
    let ids = all_ids(&tree);
    let mut rng = Lcg(seed);

    for _ in 0..200 {
        let id = ids[rng.pick(ids.len())];
        let before = snapshot(&tree);
        let total_before = Aggregator::total(&tree).minor() as i128;
        let was_checked = tree.get(id).unwrap().is_checked();

        let changes = tree.toggle(id).unwrap();

        // Target first, no node twice
        assert_eq!(changes.iter().next().map(|c| c.id), Some(id));
        let unique: HashSet<NodeId> = changes.ids().into_iter().collect();
        assert_eq!(unique.len(), changes.len());

        // Every reported change is a real flip, direction matches the target
        let after = snapshot(&tree);
        let flipped = before.iter().zip(&after).filter(|(b, a)| b != a).count();
        assert_eq!(flipped, changes.len());
        assert!(changes.iter().all(|c| c.checked == !was_checked));

        // Downward closure on uncheck
        if was_checked {
            assert!(tree.descendants(id).iter().all(|d| !d.is_checked()));
        }

        assert_upward_closed(&tree);

        // Total is exact and moves by exactly the flipped prices
        let total_after = Aggregator::total(&tree).minor();
        assert_eq!(total_after, manual_total(&tree));
        assert_eq!(
            total_after as i128 - total_before,
            Aggregator::delta(&tree, &changes)
        );
    }
}

#[rstest]
#[case(3)]
#[case(99)]
fn given_any_state_when_double_toggle_leaf_then_state_restored(
    deep_tree: ServiceTree,
    #[case] seed: u64,
) {
    let mut tree = deep_tree;
    let ids = all_ids(&tree);
    let mut rng = Lcg(seed);
    let leaves: Vec<NodeId> = ids
        .iter()
        .copied()
        .filter(|&id| tree.child_services(id).is_empty())
        .collect();

    for _ in 0..50 {
        tree.toggle(ids[rng.pick(ids.len())]).unwrap();
        let before = snapshot(&tree);

        let leaf = leaves[rng.pick(leaves.len())];
        tree.toggle(leaf).unwrap();
        tree.toggle(leaf).unwrap();

        // Checked leaf: the pair restores everything. Unchecked leaf:
        // ancestors checked on the way up stay checked.
        let after = snapshot(&tree);
        if before[leaf.0 as usize] {
            assert_eq!(after, before);
        } else {
            assert!(!tree.get(leaf).unwrap().is_checked());
            assert_upward_closed(&tree);
        }
    }
}

#[test]
fn given_unchecked_tree_when_double_toggle_checked_node_then_restored() {
    // Uncheck then re-check a checked node whose descendants were unchecked
    let mut tree = sample_tree();
    tree.toggle(NodeId(3)).unwrap();
    let before = snapshot(&tree);

    tree.toggle(NodeId(3)).unwrap();
    tree.toggle(NodeId(3)).unwrap();

    assert_eq!(snapshot(&tree), before);
}

#[rstest]
fn given_checked_ancestor_when_checking_descendant_then_stops_at_first_checked(
    deep_tree: ServiceTree,
) {
    let mut tree = deep_tree;
    // 0 -> 1 -> 4 -> 13 is one branch
    tree.toggle(NodeId(1)).unwrap();

    let changes = tree.toggle(NodeId(13)).unwrap();

    assert_eq!(changes.ids(), vec![NodeId(13), NodeId(4)]);
}

#[rstest]
fn given_checked_subtree_when_unchecking_root_then_preorder_and_skips_unchecked(
    deep_tree: ServiceTree,
) {
    let mut tree = deep_tree;
    tree.toggle(NodeId(13)).unwrap(); // 13, 4, 1, 0
    tree.toggle(NodeId(16)).unwrap(); // 16, 5
    tree.toggle(NodeId(3)).unwrap(); // 3

    let changes = tree.toggle(NodeId(0)).unwrap();

    assert_eq!(
        changes.ids(),
        vec![NodeId(0), NodeId(1), NodeId(4), NodeId(13), NodeId(5), NodeId(16), NodeId(3)]
    );
    assert!(tree.checked().is_empty());
}
