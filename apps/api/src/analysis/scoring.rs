use serde::Serialize;

/// Maximum contribution of each component to the 0–100 total.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub sections: f64,
    pub keywords: f64,
    pub grammar: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            sections: 40.0,
            keywords: 50.0,
            grammar: 10.0,
        }
    }
}

/// Grammar starts from this many points and loses one per flagged match.
const GRAMMAR_BASELINE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub section_score: f64,
    pub keyword_score: f64,
    pub grammar_score: f64,
    /// Sum of the three subscores, rounded half to even.
    pub total: u32,
}

/// Fraction of `found` out of `total`, scaled to `weight`. An empty taxonomy contributes nothing.
pub fn coverage_score(found: usize, total: usize, weight: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (found as f64 / total as f64).clamp(0.0, 1.0) * weight
}

/// `max(0, 100 - matches)` scaled so a clean document earns the full grammar weight.
pub fn grammar_score(total_matches: usize, weight: f64) -> f64 {
    let remaining = (GRAMMAR_BASELINE - total_matches as f64).max(0.0);
    remaining * (weight / GRAMMAR_BASELINE)
}

/// Combines section coverage, keyword coverage and grammar match count into one score.
pub fn compute_score(
    sections_found: usize,
    sections_total: usize,
    keywords_found: usize,
    keywords_total: usize,
    grammar_matches: usize,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let section_score = coverage_score(sections_found, sections_total, weights.sections);
    let keyword_score = coverage_score(keywords_found, keywords_total, weights.keywords);
    let grammar_score = grammar_score(grammar_matches, weights.grammar);

    let total = (section_score + keyword_score + grammar_score)
        .round_ties_even()
        .clamp(0.0, 100.0) as u32;

    ScoreBreakdown {
        section_score,
        keyword_score,
        grammar_score,
        total,
    }
}
