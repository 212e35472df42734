//! Analysis pipeline: extract → normalize → {sections, keywords, grammar} → score → assemble.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::assembler::{assemble_response, AnalysisResponse};
use crate::analysis::extraction::DocumentExtractor;
use crate::analysis::keywords::match_keywords;
use crate::analysis::matching::MatchMode;
use crate::analysis::normalizer::{normalize_pages, NormalizedDocument};
use crate::analysis::scoring::{compute_score, ScoringWeights};
use crate::analysis::sections::detect_sections;
use crate::analysis::taxonomy::{KeywordTaxonomy, SectionTaxonomy};
use crate::errors::AppError;
use crate::grammar::GrammarAdapter;

/// Runs one document through the full pipeline. Cheap to clone; shared via `AppState`.
#[derive(Clone)]
pub struct Analyzer {
    extractor: Arc<dyn DocumentExtractor>,
    grammar: GrammarAdapter,
    sections: Arc<SectionTaxonomy>,
    keywords: Arc<KeywordTaxonomy>,
    weights: ScoringWeights,
    match_mode: MatchMode,
}

impl Analyzer {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        grammar: GrammarAdapter,
        sections: Arc<SectionTaxonomy>,
        keywords: Arc<KeywordTaxonomy>,
        match_mode: MatchMode,
    ) -> Self {
        Self {
            extractor,
            grammar,
            sections,
            keywords,
            weights: ScoringWeights::default(),
            match_mode,
        }
    }

    /// Analyzes an uploaded document. Extraction and rate-limit failures abort
    /// the whole analysis; no partial score is produced.
    pub async fn analyze(&self, document: Bytes) -> Result<AnalysisResponse, AppError> {
        let span = info_span!("analysis", analysis_id = %Uuid::new_v4(), bytes = document.len());
        async move {
            let pages = self.extract(document).await?;
            let doc = normalize_pages(&pages);
            debug!(
                "Extracted {} pages ({} with text), {} chars normalized",
                pages.len(),
                pages.iter().filter(|p| p.is_some()).count(),
                doc.char_len()
            );
            self.analyze_document(&doc).await
        }
        .instrument(span)
        .await
    }

    /// Scores already-normalized text.
    pub async fn analyze_document(
        &self,
        doc: &NormalizedDocument,
    ) -> Result<AnalysisResponse, AppError> {
        let sections = detect_sections(doc, &self.sections, self.match_mode);
        let keywords = match_keywords(doc, &self.keywords, self.match_mode);
        let grammar = self.grammar.check(doc).await?;

        let score = compute_score(
            sections.found_count(),
            sections.total(),
            keywords.found.len(),
            keywords.total(),
            grammar.total_matches,
            &self.weights,
        );

        info!(
            ats_score = score.total,
            sections_found = sections.found_count(),
            keywords_found = keywords.found.len(),
            grammar_matches = grammar.total_matches,
            "Analysis complete"
        );

        Ok(assemble_response(
            sections,
            keywords,
            grammar,
            score,
            self.grammar.attribution(),
        ))
    }

    /// PDF parsing is CPU-bound and may panic on malformed input, so it runs on
    /// the blocking pool and a panic is reported as an unreadable document.
    async fn extract(&self, document: Bytes) -> Result<Vec<Option<String>>, AppError> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract_pages(&document))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    AppError::Extraction("document could not be parsed".to_string())
                } else {
                    AppError::Internal(anyhow::Error::new(e).context("Extraction task failed"))
                }
            })?
    }
}
