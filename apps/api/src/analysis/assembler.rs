//! Shapes pipeline results into the public response contract. Selection only;
//! nothing here recomputes detection, matching or scoring.

use serde::Serialize;

use crate::analysis::keywords::{CategoryResult, KeywordResult};
use crate::analysis::scoring::ScoreBreakdown;
use crate::analysis::sections::SectionResult;
use crate::grammar::{GrammarIssue, GrammarReport};

#[derive(Debug, Clone, Serialize)]
pub struct CvFeedback {
    pub missing_sections: Vec<String>,
    pub found_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub keyword_categories: Vec<CategoryResult>,
    pub grammar_issues: Vec<GrammarIssue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    pub ats_score: u32,
    pub score_breakdown: ScoreBreakdown,
    pub cv_feedback: CvFeedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

pub fn assemble_response(
    sections: SectionResult,
    keywords: KeywordResult,
    grammar: GrammarReport,
    score: ScoreBreakdown,
    attribution: Option<String>,
) -> AnalysisResponse {
    AnalysisResponse {
        success: true,
        ats_score: score.total,
        score_breakdown: score,
        cv_feedback: CvFeedback {
            missing_sections: sections.missing(),
            found_keywords: keywords.found,
            missing_keywords: keywords.missing,
            keyword_categories: keywords.categories,
            grammar_issues: grammar.issues,
        },
        attribution,
    }
}
