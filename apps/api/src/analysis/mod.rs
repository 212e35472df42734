// CV Analysis & Scoring Pipeline
// Text normalization, section/keyword detection, scoring and response assembly.
// Grammar checking lives in `crate::grammar`; this module only consumes its report.

pub mod assembler;
pub mod extraction;
pub mod keywords;
pub mod matching;
pub mod normalizer;
pub mod pipeline;
pub mod scoring;
pub mod sections;
pub mod taxonomy;
