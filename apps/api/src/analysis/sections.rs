use serde::Serialize;

use crate::analysis::matching::MatchMode;
use crate::analysis::normalizer::NormalizedDocument;
use crate::analysis::taxonomy::SectionTaxonomy;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionPresence {
    pub section: String,
    pub found: bool,
}

/// Per-section presence, in taxonomy order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionResult {
    pub sections: Vec<SectionPresence>,
}

impl SectionResult {
    pub fn found_count(&self) -> usize {
        self.sections.iter().filter(|s| s.found).count()
    }

    pub fn total(&self) -> usize {
        self.sections.len()
    }

    pub fn missing(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter(|s| !s.found)
            .map(|s| s.section.clone())
            .collect()
    }
}

/// A section is found iff any of its synonym phrases occurs in the document.
pub fn detect_sections(
    doc: &NormalizedDocument,
    taxonomy: &SectionTaxonomy,
    mode: MatchMode,
) -> SectionResult {
    let text = doc.as_str();
    SectionResult {
        sections: taxonomy
            .sections()
            .iter()
            .map(|def| SectionPresence {
                section: def.name.clone(),
                found: def.synonyms.iter().any(|phrase| mode.contains(text, phrase)),
            })
            .collect(),
    }
}
