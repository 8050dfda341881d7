//! Deployment readiness scoring.
//!
//! Takes generated code and its test suite and produces a weighted score
//! across five categories, a list of concrete findings, fixed
//! remediation advice per weak category, and a coarse fix-time estimate.
//! The scorer is deterministic and purely lexical, so it works on any
//! text the generation pipeline produced, even text that would not
//! parse.

mod checks;
pub mod report;

use serde::{Deserialize, Serialize};

use crate::error::round2;
pub use report::readiness_report;

/// Relative weight of each category in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub code_quality: f64,
    pub test_coverage: f64,
    pub security: f64,
    pub performance: f64,
    pub documentation: f64,
}

/// The weights sum to 1.0; code quality and tests dominate.
pub const SCORE_WEIGHTS: ScoreWeights = ScoreWeights {
    code_quality: 0.30,
    test_coverage: 0.25,
    security: 0.20,
    performance: 0.15,
    documentation: 0.10,
};

impl ScoreWeights {
    pub fn weighted_total(&self, scores: &DetailedScores) -> f64 {
        scores.code_quality * self.code_quality
            + scores.test_coverage * self.test_coverage
            + scores.security * self.security
            + scores.performance * self.performance
            + scores.documentation * self.documentation
    }
}

/// Per-category scores, each in `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetailedScores {
    pub code_quality: f64,
    pub test_coverage: f64,
    pub security: f64,
    pub performance: f64,
    pub documentation: f64,
}

impl DetailedScores {
    /// Categories in reporting order.
    pub fn iter(&self) -> [(&'static str, f64); 5] {
        [
            ("code_quality", self.code_quality),
            ("test_coverage", self.test_coverage),
            ("security", self.security),
            ("performance", self.performance),
            ("documentation", self.documentation),
        ]
    }
}

/// Risk band derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(overall: f64) -> Self {
        if overall >= 90.0 {
            RiskLevel::Low
        } else if overall >= 70.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full verdict for one code-plus-tests pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentAssessment {
    pub ready_for_deployment: bool,
    pub overall_score: f64,
    pub detailed_scores: DetailedScores,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
    pub estimated_fix_time: String,
}

/// Scores code and tests against the five readiness categories.
#[derive(Debug, Clone)]
pub struct DeploymentReadinessScorer {
    readiness_threshold: f64,
}

impl Default for DeploymentReadinessScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl DeploymentReadinessScorer {
    pub fn new() -> Self {
        DeploymentReadinessScorer {
            readiness_threshold: 70.0,
        }
    }

    pub fn with_threshold(readiness_threshold: f64) -> Self {
        DeploymentReadinessScorer {
            readiness_threshold,
        }
    }

    /// Assess one generated module and its test suite.
    ///
    /// Readiness and the risk band are decided on the unrounded weighted
    /// total; only the stored `overall_score` is rounded, so a 69.996
    /// shows as 70.0 but still fails the gate.
    pub fn assess(&self, code: &str, tests: &str, language: &str) -> DeploymentAssessment {
        let code_quality = checks::code_quality(code, language);
        let test_coverage = checks::test_coverage(tests, language);
        let security = checks::security(code);
        let performance = checks::performance(code);
        let documentation = checks::documentation(code);

        let detailed_scores = DetailedScores {
            code_quality: code_quality.score,
            test_coverage: test_coverage.score,
            security: security.score,
            performance: performance.score,
            documentation: documentation.score,
        };
        let overall = SCORE_WEIGHTS.weighted_total(&detailed_scores);

        let banded = banded_issues(&detailed_scores);
        let mut issues = Vec::new();
        for sub in [
            &code_quality,
            &test_coverage,
            &security,
            &performance,
            &documentation,
        ] {
            issues.extend(sub.findings.iter().cloned());
        }
        issues.extend(banded.iter().cloned());

        DeploymentAssessment {
            ready_for_deployment: overall >= self.readiness_threshold,
            overall_score: round2(overall),
            detailed_scores,
            issues,
            recommendations: recommendations(&detailed_scores),
            risk_level: RiskLevel::from_score(overall),
            estimated_fix_time: estimate_fix_time(&banded),
        }
    }
}

/// One summary line per category that scores below 85.
fn banded_issues(scores: &DetailedScores) -> Vec<String> {
    let mut issues = Vec::new();
    for (category, score) in scores.iter() {
        if score < 50.0 {
            issues.push(format!("Critical {category} issues (score: {score:.1})"));
        } else if score < 70.0 {
            issues.push(format!("Moderate {category} issues (score: {score:.1})"));
        } else if score < 85.0 {
            issues.push(format!("Minor {category} issues (score: {score:.1})"));
        }
    }
    issues
}

const CODE_QUALITY_ADVICE: [&str; 4] = [
    "Add proper error handling with try-except blocks",
    "Include logging configuration",
    "Add docstrings to functions and classes",
    "Follow PEP 8 style guidelines",
];

const TEST_COVERAGE_ADVICE: [&str; 4] = [
    "Add more unit tests",
    "Include edge case testing",
    "Add integration tests",
    "Test error scenarios",
];

const SECURITY_ADVICE: [&str; 4] = [
    "Remove hardcoded credentials",
    "Add input validation",
    "Use parameterized queries for database operations",
    "Implement proper authentication",
];

const PERFORMANCE_ADVICE: [&str; 4] = [
    "Optimize nested loops",
    "Use async/await for I/O operations",
    "Implement caching where appropriate",
    "Use efficient data structures",
];

const DOCUMENTATION_ADVICE: [&str; 4] = [
    "Add comprehensive docstrings",
    "Include inline comments",
    "Create README file",
    "Document dependencies and setup",
];

/// Fixed advice for every category under 70, deduplicated in order.
fn recommendations(scores: &DetailedScores) -> Vec<String> {
    let mut advice: Vec<&'static str> = Vec::new();
    if scores.code_quality < 70.0 {
        advice.extend(CODE_QUALITY_ADVICE);
    }
    if scores.test_coverage < 70.0 {
        advice.extend(TEST_COVERAGE_ADVICE);
    }
    if scores.security < 70.0 {
        advice.extend(SECURITY_ADVICE);
    }
    if scores.performance < 70.0 {
        advice.extend(PERFORMANCE_ADVICE);
    }
    if scores.documentation < 70.0 {
        advice.extend(DOCUMENTATION_ADVICE);
    }

    let mut out = Vec::new();
    for item in advice {
        if !out.iter().any(|seen: &String| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}

/// Two hours per critical band, one per moderate, half per minor.
fn estimate_fix_time(banded: &[String]) -> String {
    let critical = banded.iter().filter(|i| i.contains("Critical")).count();
    let moderate = banded.iter().filter(|i| i.contains("Moderate")).count();
    let minor = banded.iter().filter(|i| i.contains("Minor")).count();

    if critical + moderate + minor == 0 {
        return "0 hours".to_string();
    }

    let total_hours = critical as f64 * 2.0 + moderate as f64 + minor as f64 * 0.5;
    if total_hours < 1.0 {
        "Less than 1 hour".to_string()
    } else if total_hours < 8.0 {
        format!("{total_hours:.1} hours")
    } else {
        format!("{:.1} days", total_hours / 8.0)
    }
}
