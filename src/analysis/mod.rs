//! Static Code Analysis
//!
//! Heuristic, text-level analysis of source code: structure extraction,
//! complexity estimation and a quality score. Nothing here compiles or
//! executes the analyzed code; every metric is derived from a lexical scan,
//! so results are deterministic for identical input.

pub mod analyzer;
pub mod report;
pub mod scaffold;

pub use analyzer::{detect_language_from_path, AnalyzerSettings, StaticCodeAnalyzer};
pub use report::complexity_report;
pub use scaffold::TestScaffoldGenerator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Banded complexity rating derived from the summed per-function score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityBand {
    Low,
    Medium,
    High,
}

impl ComplexityBand {
    /// Band edges: 5 is still Low, 10 is still Medium, 11 is High.
    pub fn from_score(score: u32) -> Self {
        if score <= 5 {
            ComplexityBand::Low
        } else if score <= 10 {
            ComplexityBand::Medium
        } else {
            ComplexityBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityBand::Low => "low",
            ComplexityBand::Medium => "medium",
            ComplexityBand::High => "high",
        }
    }
}

impl fmt::Display for ComplexityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw counters collected by the lexical scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeMetrics {
    pub lines_of_code: usize,
    pub characters: usize,
    pub functions: usize,
    pub classes: usize,
    pub imports: usize,
    pub variables: usize,
    pub comments: usize,
    pub docstrings: usize,
    pub complexity_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub args: Vec<String>,
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub methods: Vec<String>,
    pub line_count: usize,
}

/// Structural elements found in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeStructure {
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub imports: Vec<String>,
}

/// Full result of analyzing one piece of source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub language: String,
    pub metrics: CodeMetrics,
    pub structure: CodeStructure,
    pub complexity: ComplexityBand,
    pub quality_score: f64,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

impl CodeAnalysis {
    /// Degraded result for input the scanner could not interpret.
    pub fn degraded(language: &str, reason: String) -> Self {
        Self {
            language: language.to_string(),
            metrics: CodeMetrics::default(),
            structure: CodeStructure::default(),
            complexity: ComplexityBand::Low,
            quality_score: 0.0,
            issues: vec![format!("Syntax error: {}", reason)],
            suggestions: vec!["Fix syntax errors before further analysis".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_band_edges() {
        assert_eq!(ComplexityBand::from_score(0), ComplexityBand::Low);
        assert_eq!(ComplexityBand::from_score(5), ComplexityBand::Low);
        assert_eq!(ComplexityBand::from_score(6), ComplexityBand::Medium);
        assert_eq!(ComplexityBand::from_score(10), ComplexityBand::Medium);
        assert_eq!(ComplexityBand::from_score(11), ComplexityBand::High);
    }

    #[test]
    fn test_band_serializes_lowercase() {
        let json = serde_json::to_string(&ComplexityBand::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn test_degraded_analysis_is_zeroed() {
        let analysis = CodeAnalysis::degraded("python", "unbalanced brackets".to_string());
        assert_eq!(analysis.metrics, CodeMetrics::default());
        assert_eq!(analysis.quality_score, 0.0);
        assert!(analysis.issues[0].starts_with("Syntax error"));
    }
}
