use std::path::Path;
use std::rc::Rc;

use log::{debug, info, warn};
use snippetbox_highlight::Language;

use crate::cursor::{LanguageBucket, StoreCursor};
use crate::error::SnippetError;
use crate::events::{ChangeKind, Observers, SnippetSetListener, SubscriptionId};
use crate::hierarchy::{SnippetNode, SnippetTree};
use crate::persistence;
use crate::snippet::Snippet;

const MEMORY_ORIGIN: &str = "<memory>";

/// 片段集合的權威儲存區。 / Authoritative store of snippets, partitioned by language.
///
/// Names are unique across the whole store, ignoring case. Languages keep the
/// order in which their first snippet arrived; a language whose last snippet
/// is removed disappears from the store.
#[derive(Debug, Default)]
pub struct SnippetManager {
    buckets: Vec<LanguageBucket>,
    listeners: Observers<dyn SnippetSetListener>,
}

impl SnippetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `snippet` into its language bucket and emits [`ChangeKind::Add`].
    pub fn add(&mut self, snippet: Snippet) -> Result<(), SnippetError> {
        self.insert(snippet)?;
        self.notify(ChangeKind::Add);
        Ok(())
    }

    /// Removes the first snippet whose name equals `snippet`'s exactly, then
    /// emits [`ChangeKind::Delete`] whether or not anything was removed.
    pub fn delete(&mut self, snippet: &Snippet) {
        if self.remove_exact(snippet.name()).is_none() {
            debug!("delete of '{}' matched nothing", snippet.name());
        }
        self.notify(ChangeKind::Delete);
    }

    /// Replaces `old` with `new` and emits [`ChangeKind::Update`].
    ///
    /// When no snippet named like `old` exists the store is left alone and the
    /// event is still emitted. Otherwise `old` is removed only on an exact name
    /// match, as in [`delete`](Self::delete), and `new` is inserted. A `new`
    /// name that collides with any snippet other than the one being removed
    /// fails with `DuplicateName` before anything changes.
    pub fn update(&mut self, old: &Snippet, new: Snippet) -> Result<(), SnippetError> {
        self.replace(old, new)?;
        self.notify(ChangeKind::Update);
        Ok(())
    }

    /// Same mutation as [`update`](Self::update) without notifying listeners.
    pub fn update_content_only(&mut self, old: &Snippet, new: Snippet) -> Result<(), SnippetError> {
        self.replace(old, new)
    }

    /// Case-insensitive lookup. An empty name finds nothing.
    pub fn find_by_name(&self, name: &str) -> Option<&Snippet> {
        if name.is_empty() {
            return None;
        }
        self.iter().find(|snippet| snippet.has_name(name))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    pub fn count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Every snippet, language by language, in name order within a language.
    pub fn iter(&self) -> impl Iterator<Item = &Snippet> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.entries.values())
    }

    /// Languages that currently hold snippets, in first-seen order.
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.buckets.iter().map(|bucket| bucket.language)
    }

    pub fn snippets_for(&self, language: Language) -> impl Iterator<Item = &Snippet> {
        self.buckets
            .iter()
            .filter(move |bucket| bucket.language == language)
            .flat_map(|bucket| bucket.entries.values())
    }

    /// Drops every snippet and emits [`ChangeKind::Delete`].
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.notify(ChangeKind::Delete);
    }

    /// Builds a fresh root → language → snippet tree from the current contents.
    pub fn build_hierarchy(&self) -> SnippetTree {
        let categories = self
            .buckets
            .iter()
            .filter(|bucket| !bucket.entries.is_empty())
            .map(|bucket| {
                let leaves = bucket
                    .entries
                    .values()
                    .cloned()
                    .map(SnippetNode::leaf)
                    .collect();
                SnippetNode::category(category_label(bucket.language), leaves)
            })
            .collect();
        SnippetTree::new(categories)
    }

    /// Replaces the whole store with the document at `path`.
    ///
    /// On failure the store is unchanged and no event is emitted.
    pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<(), SnippetError> {
        let path = path.as_ref();
        let xml = persistence::read_file(path)?;
        let buckets = persistence::read_document(&xml, &path.display().to_string())?;
        self.buckets = buckets;
        info!("loaded {} snippets from {}", self.count(), path.display());
        self.notify(ChangeKind::Load);
        Ok(())
    }

    pub fn load_from_str(&mut self, xml: &str) -> Result<(), SnippetError> {
        self.buckets = persistence::read_document(xml, MEMORY_ORIGIN)?;
        debug!("loaded {} snippets from memory", self.count());
        self.notify(ChangeKind::Load);
        Ok(())
    }

    /// Writes the whole store to `path` and emits [`ChangeKind::Save`].
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SnippetError> {
        let path = path.as_ref();
        let xml = self.to_xml_string()?;
        persistence::write_file(path, &xml)?;
        info!("saved {} snippets to {}", self.count(), path.display());
        self.notify(ChangeKind::Save);
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String, SnippetError> {
        persistence::write_document(&self.buckets)
    }

    pub fn subscribe(&self, listener: Rc<dyn SnippetSetListener>) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn subscribe_fn(
        &self,
        listener: impl Fn(&SnippetManager, ChangeKind) + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(Rc::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Delivers `kind` to every listener, in subscription order.
    pub fn notify(&self, kind: ChangeKind) {
        self.listeners
            .notify(|listener| listener.snippets_changed(self, kind));
    }

    fn insert(&mut self, snippet: Snippet) -> Result<(), SnippetError> {
        if self.contains_name(snippet.name()) {
            return Err(SnippetError::DuplicateName(snippet.name().to_string()));
        }
        debug!("adding '{}' to {}", snippet.name(), snippet.language());
        let language = snippet.language();
        let index = match self
            .buckets
            .iter()
            .position(|bucket| bucket.language == language)
        {
            Some(index) => index,
            None => {
                self.buckets.push(LanguageBucket::new(language));
                self.buckets.len() - 1
            }
        };
        self.buckets[index]
            .entries
            .insert(snippet.name().to_string(), snippet);
        Ok(())
    }

    fn replace(&mut self, old: &Snippet, new: Snippet) -> Result<(), SnippetError> {
        if !self.contains_name(old.name()) {
            warn!("update of '{}' ignored: no such snippet", old.name());
            return Ok(());
        }
        // Only an exact-name hit is removed, same as delete.
        let collides = self
            .iter()
            .any(|snippet| snippet.has_name(new.name()) && snippet.name() != old.name());
        if collides {
            return Err(SnippetError::DuplicateName(new.name().to_string()));
        }
        self.remove_exact(old.name());
        self.insert(new)
    }

    /// Full-store scan removing the first snippet named exactly `name`.
    fn remove_exact(&mut self, name: &str) -> Option<Snippet> {
        let mut cursor = StoreCursor::new();
        let mut removed = None;
        while let Some(snippet) = cursor.next(&self.buckets) {
            if snippet.name() == name {
                removed = cursor.remove_current(&mut self.buckets);
                break;
            }
        }
        self.buckets.retain(|bucket| !bucket.entries.is_empty());
        if let Some(snippet) = &removed {
            debug!("removed '{}' from {}", snippet.name(), snippet.language());
        }
        removed
    }
}

/// Label of the tree node grouping one language's snippets.
pub fn category_label(language: Language) -> String {
    format!("{} Snippets", language.display_name())
}
