use std::ptr;

use crate::filter::{normalize_filter, FilterMatcher, SnippetMatcher};
use crate::hierarchy::TreeModel;
use crate::snippet::Snippet;

/// Live filtering adapter over a [`TreeModel`].
///
/// A node is visible when its label contains the filter, when its snippet
/// passes the matcher, or when any descendant is visible. Nothing is cached:
/// every query walks the backing model again, so a new filter applies to the
/// very next call.
#[derive(Debug, Clone)]
pub struct FilteredTreeModel<M, F = SnippetMatcher> {
    model: M,
    matcher: F,
    filter: String,
}

impl<M: TreeModel> FilteredTreeModel<M> {
    pub fn new(model: M) -> Self {
        Self::with_matcher(model, SnippetMatcher)
    }
}

impl<M, F> FilteredTreeModel<M, F>
where
    M: TreeModel,
    F: FilterMatcher<Snippet>,
{
    pub fn with_matcher(model: M, matcher: F) -> Self {
        Self {
            model,
            matcher,
            filter: String::new(),
        }
    }

    /// Stores the trimmed, lower-cased filter.
    pub fn set_filter(&mut self, text: &str) {
        self.filter = normalize_filter(text);
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_inner(self) -> M {
        self.model
    }

    pub fn root(&self) -> &M::Node {
        self.model.root()
    }

    pub fn is_leaf(&self, node: &M::Node) -> bool {
        self.model.is_leaf(node)
    }

    pub fn child_count(&self, node: &M::Node) -> usize {
        self.visible_children(node).count()
    }

    pub fn child_at<'a>(&'a self, node: &'a M::Node, index: usize) -> Option<&'a M::Node> {
        self.visible_children(node).nth(index)
    }

    /// Position of `child` among the visible children of `node`.
    pub fn index_of(&self, node: &M::Node, child: &M::Node) -> Option<usize> {
        self.visible_children(node)
            .position(|candidate| ptr::eq(candidate, child))
    }

    pub fn visible_children<'a>(
        &'a self,
        node: &'a M::Node,
    ) -> impl Iterator<Item = &'a M::Node> + 'a {
        (0..self.model.child_count(node))
            .filter_map(move |index| self.model.child(node, index))
            .filter(move |child| self.is_visible(child))
    }

    /// Whether `node` or one of its descendants passes the filter.
    pub fn is_visible(&self, node: &M::Node) -> bool {
        if self.model.label(node).to_lowercase().contains(&self.filter) {
            return true;
        }
        if let Some(snippet) = self.model.snippet(node) {
            if self.matcher.matches(snippet, &self.filter) {
                return true;
            }
        }
        (0..self.model.child_count(node))
            .filter_map(|index| self.model.child(node, index))
            .any(|child| self.is_visible(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain label tree with no snippets.
    struct Outline {
        root: Entry,
    }

    struct Entry {
        label: &'static str,
        children: Vec<Entry>,
    }

    fn entry(label: &'static str, children: Vec<Entry>) -> Entry {
        Entry { label, children }
    }

    impl TreeModel for Outline {
        type Node = Entry;

        fn root(&self) -> &Entry {
            &self.root
        }

        fn child_count(&self, node: &Entry) -> usize {
            node.children.len()
        }

        fn child<'a>(&'a self, node: &'a Entry, index: usize) -> Option<&'a Entry> {
            node.children.get(index)
        }

        fn label<'a>(&'a self, node: &'a Entry) -> &'a str {
            node.label
        }
    }

    fn outline() -> Outline {
        Outline {
            root: entry(
                "root",
                vec![
                    entry("fruit", vec![entry("Apple", vec![]), entry("pear", vec![])]),
                    entry("veg", vec![entry("carrot", vec![])]),
                ],
            ),
        }
    }

    #[test]
    fn empty_filter_shows_everything() {
        let view = FilteredTreeModel::new(outline());
        let root = view.root();
        assert_eq!(view.child_count(root), 2);
        let fruit = view.child_at(root, 0).unwrap();
        assert_eq!(view.child_count(fruit), 2);
    }

    #[test]
    fn ancestors_of_matches_stay_visible() {
        let mut view = FilteredTreeModel::new(outline());
        view.set_filter("  APPLE ");
        assert_eq!(view.filter(), "apple");
        let root = view.root();
        assert_eq!(view.child_count(root), 1);
        let fruit = view.child_at(root, 0).unwrap();
        assert_eq!(fruit.label, "fruit");
        assert_eq!(view.child_count(fruit), 1);
        assert_eq!(view.child_at(fruit, 0).unwrap().label, "Apple");
        assert!(view.child_at(fruit, 1).is_none());
    }

    #[test]
    fn index_of_uses_filtered_positions() {
        let mut view = FilteredTreeModel::new(outline());
        view.set_filter("carrot");
        let root = view.root();
        let veg = &view.model().root.children[1];
        let fruit = &view.model().root.children[0];
        assert_eq!(view.index_of(root, veg), Some(0));
        assert_eq!(view.index_of(root, fruit), None);
    }

    #[test]
    fn filter_change_applies_to_next_query() {
        let mut view = FilteredTreeModel::new(outline());
        view.set_filter("nothing-matches");
        assert_eq!(view.child_count(view.root()), 0);
        view.set_filter("");
        assert_eq!(view.child_count(view.root()), 2);
        assert!(view.is_leaf(&view.model().root.children[1].children[0]));
    }
}
