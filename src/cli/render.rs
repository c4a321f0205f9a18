//! Text rendering of the service tree, change batches and totals.

use termtree::Tree;

use crate::application::services::ChangeListener;
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{Aggregator, ChangeSet, NodeId, Price, ServiceNode, ServiceTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub currency_symbol: String,
    pub show_ids: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for RenderOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            currency_symbol: settings.currency_symbol.clone(),
            show_ids: settings.show_ids,
        }
    }
}

impl RenderOptions {
    pub fn price(&self, price: Price) -> String {
        format!("{}{}", self.currency_symbol, price)
    }

    pub fn label(&self, node: &ServiceNode) -> String {
        if self.show_ids {
            format!("{} ({})", node.title(), node.id())
        } else {
            node.title().to_string()
        }
    }

    /// One checkbox line, e.g. `[x] Sugar (6)  $1`.
    pub fn line(&self, node: &ServiceNode) -> String {
        let mark = if node.is_checked() { "[x]" } else { "[ ]" };
        format!("{} {}  {}", mark, self.label(node), self.price(node.price()))
    }

    pub fn total(&self, total: Price) -> String {
        format!("Total: {}", self.price(total))
    }
}

/// Tree of checkbox lines under a `services` root.
pub fn render_tree(tree: &ServiceTree, opts: &RenderOptions) -> Tree<String> {
    fn build(tree: &ServiceTree, node: &ServiceNode, opts: &RenderOptions) -> Tree<String> {
        let leaves: Vec<_> = tree
            .child_services(node.id())
            .into_iter()
            .map(|child| build(tree, child, opts))
            .collect();
        Tree::new(opts.line(node)).with_leaves(leaves)
    }

    let leaves: Vec<_> = tree
        .root_services()
        .into_iter()
        .map(|root| build(tree, root, opts))
        .collect();
    Tree::new("services".to_string()).with_leaves(leaves)
}

/// Labels of a change batch in flip order, paired with the new state.
pub fn change_labels(
    tree: &ServiceTree,
    changes: &ChangeSet,
    opts: &RenderOptions,
) -> Vec<(bool, String)> {
    changes
        .iter()
        .map(|c| {
            let label = tree
                .get(c.id)
                .map(|n| opts.label(n))
                .unwrap_or_else(|| c.id.to_string());
            (c.checked, label)
        })
        .collect()
}

/// Resolve an argument as id first, then as title.
pub fn resolve_service(tree: &ServiceTree, arg: &str) -> Option<NodeId> {
    if let Ok(id) = arg.parse::<NodeId>() {
        if tree.contains(id) {
            return Some(id);
        }
    }
    tree.find_by_title(arg).map(|n| n.id())
}

/// Subscriber that prints each change batch and the new total.
pub struct PrintingRenderer {
    opts: RenderOptions,
}

impl PrintingRenderer {
    pub fn new(opts: RenderOptions) -> Self {
        Self { opts }
    }
}

impl ChangeListener for PrintingRenderer {
    fn state_changed(&mut self, tree: &ServiceTree, changes: &ChangeSet) {
        for (checked, label) in change_labels(tree, changes, &self.opts) {
            if checked {
                output::diff_add(&label);
            } else {
                output::diff_remove(&label);
            }
        }
        output::detail(&self.opts.total(Aggregator::total(tree)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::CatalogService;

    fn sample() -> ServiceTree {
        ServiceTree::from_descriptors(CatalogService::sample()).unwrap()
    }

    #[test]
    fn test_render_tree_nests_children() {
        let mut tree = sample();
        tree.toggle(NodeId(6)).unwrap();

        let text = render_tree(&tree, &RenderOptions::default()).to_string();

        assert!(text.starts_with("services\n"));
        assert!(text.contains("[x] coffee drinking (3)  $10"));
        assert!(text.contains("[x] Sugar (6)  $1"));
        assert!(text.contains("[ ] Cream (7)  $1"));
        let coffee = text.find("coffee drinking").unwrap();
        let sugar = text.find("Sugar").unwrap();
        assert!(coffee < sugar);
    }

    #[test]
    fn test_change_labels_follow_flip_order() {
        let mut tree = sample();
        let opts = RenderOptions {
            currency_symbol: "$".into(),
            show_ids: false,
        };
        let changes = tree.toggle(NodeId(6)).unwrap();
        assert_eq!(
            change_labels(&tree, &changes, &opts),
            vec![(true, "Sugar".to_string()), (true, "coffee drinking".to_string())]
        );
        let changes = tree.toggle(NodeId(3)).unwrap();
        assert_eq!(
            change_labels(&tree, &changes, &opts),
            vec![(false, "coffee drinking".to_string()), (false, "Sugar".to_string())]
        );
    }

    #[test]
    fn test_resolve_service_by_id_or_title() {
        let tree = sample();
        assert_eq!(resolve_service(&tree, "7"), Some(NodeId(7)));
        assert_eq!(resolve_service(&tree, "decaf"), Some(NodeId(8)));
        assert_eq!(resolve_service(&tree, "42"), None);
        assert_eq!(resolve_service(&tree, "tea"), None);
    }
}
