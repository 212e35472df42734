//! Static term taxonomies for section detection and keyword matching.
//!
//! Built once at startup (failure is fatal) and shared read-only (`Arc`) across every request.

use anyhow::{bail, Result};

/// A canonical résumé section and the phrases that signal it.
#[derive(Debug, Clone)]
pub struct SectionDefinition {
    pub name: String,
    pub synonyms: Vec<String>,
}

/// Ordered mapping of canonical section name → synonym phrases.
#[derive(Debug, Clone)]
pub struct SectionTaxonomy {
    sections: Vec<SectionDefinition>,
}

const DEFAULT_SECTIONS: &[(&str, &[&str])] = &[
    (
        "experience",
        &["experience", "work history", "employment history"],
    ),
    ("education", &["education", "qualifications", "degrees"]),
    (
        "technical_skills",
        &["technical skills", "technologies", "programming languages"],
    ),
];

impl SectionTaxonomy {
    /// Builds a taxonomy, rejecting sections without synonyms and duplicate names.
    pub fn new(sections: Vec<SectionDefinition>) -> Result<Self> {
        for (i, section) in sections.iter().enumerate() {
            if section.synonyms.iter().all(|s| s.trim().is_empty()) {
                bail!("Section '{}' has no synonym phrases", section.name);
            }
            if sections[..i].iter().any(|s| s.name == section.name) {
                bail!("Section '{}' is defined twice", section.name);
            }
        }
        Ok(Self {
            sections: sections
                .into_iter()
                .map(|s| SectionDefinition {
                    name: s.name,
                    synonyms: s.synonyms.iter().map(|p| p.to_lowercase()).collect(),
                })
                .collect(),
        })
    }

    pub fn sections(&self) -> &[SectionDefinition] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// The built-in section set: experience, education, technical skills.
    pub fn builtin() -> Result<Self> {
        Self::new(
            DEFAULT_SECTIONS
                .iter()
                .map(|(name, synonyms)| SectionDefinition {
                    name: name.to_string(),
                    synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        )
    }
}

/// A single skill term with its (optional) category label.
#[derive(Debug, Clone)]
pub struct KeywordTerm {
    pub term: String,
    pub category: Option<String>,
}

/// Ordered set of technical skill terms, optionally grouped into disjoint categories.
#[derive(Debug, Clone)]
pub struct KeywordTaxonomy {
    terms: Vec<KeywordTerm>,
}

const DEFAULT_KEYWORDS: &[(&str, &str)] = &[
    ("python", "languages"),
    ("java", "languages"),
    ("c#", "languages"),
    ("javascript", "languages"),
    ("typescript", "languages"),
    ("sql", "data"),
    ("nosql", "data"),
    ("git", "tooling"),
    ("docker", "tooling"),
    ("kubernetes", "tooling"),
    ("aws", "cloud"),
    ("azure", "cloud"),
    ("agile", "process"),
    ("scrum", "process"),
    ("ci/cd", "tooling"),
    ("machine learning", "fundamentals"),
    ("data structures", "fundamentals"),
    ("algorithms", "fundamentals"),
    ("restful apis", "architecture"),
    ("microservices", "architecture"),
    ("tdd", "process"),
    ("oop", "fundamentals"),
];

impl KeywordTaxonomy {
    /// Builds a taxonomy from terms in their reporting order.
    /// Terms are case-folded; duplicates and blank terms are rejected.
    pub fn new(terms: Vec<KeywordTerm>) -> Result<Self> {
        let mut folded: Vec<KeywordTerm> = Vec::with_capacity(terms.len());
        for term in terms {
            let lowered = term.term.trim().to_lowercase();
            if lowered.is_empty() {
                bail!("Keyword taxonomy contains a blank term");
            }
            if folded.iter().any(|t| t.term == lowered) {
                bail!("Keyword '{lowered}' is defined twice");
            }
            folded.push(KeywordTerm {
                term: lowered,
                category: term.category,
            });
        }
        Ok(Self { terms: folded })
    }

    pub fn terms(&self) -> &[KeywordTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Category labels in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for label in self.terms.iter().filter_map(|t| t.category.as_deref()) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// The built-in technical skill set, grouped by category.
    pub fn builtin() -> Result<Self> {
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(term, category)| KeywordTerm {
                    term: term.to_string(),
                    category: Some(category.to_string()),
                })
                .collect(),
        )
    }
}
