mod cursor;
mod error;
mod events;
mod filter;
mod filtered_tree;
mod find_replace;
mod hierarchy;
mod manager;
mod persistence;
mod snippet;

pub use error::SnippetError;
pub use events::{ChangeKind, Observers, SnippetSetListener, SubscriptionId};
pub use filter::{matches, normalize_filter, FilterMatcher, SnippetMatcher};
pub use filtered_tree::FilteredTreeModel;
pub use find_replace::{
    FindError, FindOptions, FindReplaceEvent, FindReplaceListener, FindReplaceSession, TextMatch,
};
pub use hierarchy::{NodeId, NodePayload, SnippetNode, SnippetTree, TreeModel, ROOT_LABEL};
pub use manager::{category_label, SnippetManager};
pub use snippet::Snippet;
pub use snippetbox_highlight::Language;
