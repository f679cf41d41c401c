use std::collections::BTreeMap;
use std::ops::Bound;

use snippetbox_highlight::Language;

use crate::snippet::Snippet;

/// All snippets of one language, keyed and ordered by name.
#[derive(Debug, Clone)]
pub(crate) struct LanguageBucket {
    pub language: Language,
    pub entries: BTreeMap<String, Snippet>,
}

impl LanguageBucket {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            entries: BTreeMap::new(),
        }
    }
}

/// Position in a full-store scan: bucket index plus the last name visited in it.
///
/// The cursor holds no borrow of the buckets, so the element just visited can
/// be removed and the scan resumed from the same place.
#[derive(Debug, Default)]
pub(crate) struct StoreCursor {
    bucket: usize,
    last: Option<String>,
}

impl StoreCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next<'a>(&mut self, buckets: &'a [LanguageBucket]) -> Option<&'a Snippet> {
        loop {
            let bucket = buckets.get(self.bucket)?;
            let next = match &self.last {
                None => bucket.entries.iter().next(),
                Some(last) => bucket
                    .entries
                    .range::<str, _>((Bound::Excluded(last.as_str()), Bound::Unbounded))
                    .next(),
            };
            match next {
                Some((key, snippet)) => {
                    self.last = Some(key.clone());
                    return Some(snippet);
                }
                None => {
                    self.bucket += 1;
                    self.last = None;
                }
            }
        }
    }

    /// Removes the element returned by the latest `next` call.
    pub fn remove_current(&mut self, buckets: &mut [LanguageBucket]) -> Option<Snippet> {
        let last = self.last.as_ref()?;
        buckets.get_mut(self.bucket)?.entries.remove(last)
    }
}
