use std::fmt;

/// The single case-folded, whitespace-collapsed text of a document.
///
/// Owned by the request that produced it. May be empty when the source had no
/// extractable text; downstream stages treat that as "nothing found", not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDocument(String);

impl NormalizedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for NormalizedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Joins the pages that yielded text with single spaces, collapses whitespace
/// runs and case-folds the result. Absent and blank pages are skipped.
pub fn normalize_pages<S: AsRef<str>>(pages: &[Option<S>]) -> NormalizedDocument {
    let joined = pages
        .iter()
        .flatten()
        .map(|page| AsRef::<str>::as_ref(page))
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    NormalizedDocument(collapsed.to_lowercase())
}
