use serde::Serialize;

use crate::analysis::matching::MatchMode;
use crate::analysis::normalizer::NormalizedDocument;
use crate::analysis::taxonomy::KeywordTaxonomy;

/// Category-level roll-up: a category is found iff any member term is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResult {
    pub category: String,
    pub found: bool,
    pub matched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordResult {
    /// Found terms, in taxonomy order.
    pub found: Vec<String>,
    /// Complement of `found`, also in taxonomy order.
    pub missing: Vec<String>,
    pub categories: Vec<CategoryResult>,
}

impl KeywordResult {
    pub fn total(&self) -> usize {
        self.found.len() + self.missing.len()
    }
}

pub fn match_keywords(
    doc: &NormalizedDocument,
    taxonomy: &KeywordTaxonomy,
    mode: MatchMode,
) -> KeywordResult {
    let text = doc.as_str();
    let (found, missing): (Vec<_>, Vec<_>) = taxonomy
        .terms()
        .iter()
        .partition(|kw| mode.contains(text, &kw.term));

    let categories = taxonomy
        .categories()
        .into_iter()
        .map(|label| {
            let matched: Vec<String> = found
                .iter()
                .filter(|kw| kw.category.as_deref() == Some(label))
                .map(|kw| kw.term.clone())
                .collect();
            CategoryResult {
                category: label.to_string(),
                found: !matched.is_empty(),
                matched,
            }
        })
        .collect();

    KeywordResult {
        found: found.into_iter().map(|kw| kw.term.clone()).collect(),
        missing: missing.into_iter().map(|kw| kw.term.clone()).collect(),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize_pages;
    use crate::analysis::taxonomy::KeywordTerm;

    fn run(text: &str) -> KeywordResult {
        let doc = normalize_pages(&[Some(text)]);
        match_keywords(
            &doc,
            &KeywordTaxonomy::builtin().unwrap(),
            MatchMode::Substring,
        )
    }

    #[test]
    fn test_found_keywords_follow_taxonomy_order() {
        let result = run("Docker, Python and AWS");
        assert_eq!(result.found, vec!["python", "docker", "aws"]);
        assert_eq!(result.total(), 22);
        assert!(!result.missing.contains(&"python".to_string()));
    }

    #[test]
    fn test_javascript_also_matches_java() {
        let result = run("JavaScript");
        assert_eq!(result.found, vec!["java", "javascript"]);
    }

    #[test]
    fn test_empty_document_reports_every_keyword_missing() {
        let result = run("");
        assert!(result.found.is_empty());
        assert_eq!(result.missing.len(), 22);
        assert!(result.categories.iter().all(|c| !c.found));
    }

    #[test]
    fn test_category_found_when_any_member_matches() {
        let result = run("deployed to azure");
        let cloud = result
            .categories
            .iter()
            .find(|c| c.category == "cloud")
            .unwrap();
        assert!(cloud.found);
        assert_eq!(cloud.matched, vec!["azure"]);
        let data = result
            .categories
            .iter()
            .find(|c| c.category == "data")
            .unwrap();
        assert!(!data.found);
    }

    #[test]
    fn test_uncategorized_taxonomy_has_no_category_results() {
        let taxonomy = KeywordTaxonomy::new(vec![KeywordTerm {
            term: "rust".to_string(),
            category: None,
        }])
        .unwrap();
        let doc = normalize_pages(&[Some("Rust and Go")]);
        let result = match_keywords(&doc, &taxonomy, MatchMode::Substring);
        assert_eq!(result.found, vec!["rust"]);
        assert!(result.categories.is_empty());
    }
}
