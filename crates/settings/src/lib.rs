pub mod preferences;

pub use preferences::{HighlightPreferences, Preferences, PreferencesError, PreferencesStore};
