use std::cell::RefCell;
use std::rc::Rc;

use snippetbox_core::{
    ChangeKind, FilteredTreeModel, Language, Snippet, SnippetError, SnippetManager, TreeModel,
};

fn snippet(name: &str, description: &str, keywords: &[&str], language: Language) -> Snippet {
    Snippet::new(name, "print(1)", description, keywords.iter().copied(), language).unwrap()
}

fn record_events(manager: &SnippetManager) -> Rc<RefCell<Vec<ChangeKind>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    manager.subscribe_fn(move |_, kind| sink.borrow_mut().push(kind));
    events
}

#[test]
fn snippets_of_one_language_share_a_category() {
    let mut manager = SnippetManager::new();
    manager
        .add(snippet("foo", "", &[], Language::Python))
        .unwrap();
    manager
        .add(snippet("bar", "", &[], Language::Python))
        .unwrap();
    assert_eq!(manager.count(), 2);

    let tree = manager.build_hierarchy();
    let root = tree.root();
    assert_eq!(tree.child_count(root), 1);
    let python = tree.child(root, 0).unwrap();
    assert_eq!(python.label(), "Python Snippets");
    let names: Vec<_> = (0..tree.child_count(python))
        .map(|index| tree.child(python, index).unwrap().label().to_string())
        .collect();
    assert_eq!(names, vec!["bar", "foo"]);
}

#[test]
fn duplicate_names_differing_in_case_are_rejected() {
    let mut manager = SnippetManager::new();
    let events = record_events(&manager);
    manager.add(snippet("Foo", "", &[], Language::Java)).unwrap();
    let err = manager
        .add(snippet("foo", "", &[], Language::Java))
        .unwrap_err();
    assert!(matches!(err, SnippetError::DuplicateName(_)));
    assert_eq!(manager.count(), 1);
    assert_eq!(*events.borrow(), vec![ChangeKind::Add]);
}

#[test]
fn update_moves_snippet_to_new_name_and_language() {
    let mut manager = SnippetManager::new();
    let a = snippet("alpha", "", &[], Language::Java);
    manager.add(a.clone()).unwrap();
    let b = snippet("beta", "", &[], Language::Php);
    manager.update(&a, b.clone()).unwrap();

    assert!(manager.find_by_name("alpha").is_none());
    assert_eq!(manager.find_by_name("BETA"), Some(&b));
    assert_eq!(manager.languages().collect::<Vec<_>>(), vec![Language::Php]);
    assert_eq!(manager.snippets_for(Language::Java).count(), 0);
    assert_eq!(manager.snippets_for(Language::Php).count(), 1);
}

#[test]
fn deleting_an_unknown_snippet_still_emits_delete() {
    let mut manager = SnippetManager::new();
    manager.add(snippet("kept", "", &[], Language::Java)).unwrap();
    let events = record_events(&manager);
    manager.delete(&snippet("never-added", "", &[], Language::Java));
    assert_eq!(manager.count(), 1);
    assert_eq!(*events.borrow(), vec![ChangeKind::Delete]);
}

#[test]
fn keyword_match_keeps_leaf_visible_and_hides_other_categories() {
    let mut manager = SnippetManager::new();
    manager
        .add(snippet("loop", "iterate a list", &["sample"], Language::Python))
        .unwrap();
    manager
        .add(snippet("main", "entry point", &["boot"], Language::Java))
        .unwrap();

    let mut view = FilteredTreeModel::new(manager.build_hierarchy());
    view.set_filter("sample");
    let root = view.root();
    assert_eq!(view.child_count(root), 1);
    let python = view.child_at(root, 0).unwrap();
    assert_eq!(python.label(), "Python Snippets");
    assert_eq!(view.child_count(python), 1);
    let leaf = view.child_at(python, 0).unwrap();
    assert_eq!(leaf.snippet().map(Snippet::name), Some("loop"));
    assert!(view.is_leaf(leaf));
    assert_eq!(view.index_of(python, leaf), Some(0));
}

#[test]
fn empty_filter_shows_every_snippet() {
    let mut manager = SnippetManager::new();
    manager.add(snippet("a", "", &[], Language::Java)).unwrap();
    manager.add(snippet("b", "", &[], Language::CSharp)).unwrap();
    manager.add(snippet("c", "", &[], Language::CSharp)).unwrap();

    let mut view = FilteredTreeModel::new(manager.build_hierarchy());
    view.set_filter("   ");
    let root = view.root();
    let visible: usize = view
        .visible_children(root)
        .map(|category| view.child_count(category))
        .sum();
    assert_eq!(visible, manager.count());
}

#[test]
fn language_label_filter_matches_whole_category() {
    let mut manager = SnippetManager::new();
    manager.add(snippet("a", "", &[], Language::CSharp)).unwrap();
    manager.add(snippet("b", "", &[], Language::Java)).unwrap();

    let mut view = FilteredTreeModel::new(manager.build_hierarchy());
    view.set_filter("C#");
    let root = view.root();
    assert_eq!(view.child_count(root), 1);
    assert_eq!(view.child_at(root, 0).unwrap().label(), "C# Snippets");
}

#[test]
fn hierarchy_is_a_snapshot() {
    let mut manager = SnippetManager::new();
    let a = snippet("a", "", &[], Language::Java);
    manager.add(a.clone()).unwrap();
    let tree = manager.build_hierarchy();
    manager.delete(&a);
    assert_eq!(tree.leaves().count(), 1);
    assert_eq!(manager.build_hierarchy().leaves().count(), 0);
}
