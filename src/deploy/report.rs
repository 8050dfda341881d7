//! Markdown rendering for deployment assessments.

use super::DeploymentAssessment;

/// Render an assessment as a markdown report.
pub fn readiness_report(assessment: &DeploymentAssessment) -> String {
    let verdict = if assessment.ready_for_deployment {
        "✅ Yes"
    } else {
        "❌ No"
    };

    let mut report = String::new();
    report.push_str("# Deployment Readiness Assessment Report\n\n");
    report.push_str("## Overall Assessment\n");
    report.push_str(&format!("- **Ready for Deployment**: {verdict}\n"));
    report.push_str(&format!(
        "- **Overall Score**: {}/100\n",
        assessment.overall_score
    ));
    report.push_str(&format!(
        "- **Risk Level**: {}\n",
        assessment.risk_level.as_str().to_uppercase()
    ));
    report.push_str(&format!(
        "- **Estimated Fix Time**: {}\n",
        assessment.estimated_fix_time
    ));

    report.push_str("\n## Detailed Scores\n");
    for (category, score) in assessment.detailed_scores.iter() {
        let status = if score >= 70.0 {
            "✅"
        } else if score >= 50.0 {
            "⚠️"
        } else {
            "❌"
        };
        report.push_str(&format!(
            "- **{}**: {status} {score:.1}/100\n",
            title_case(category)
        ));
    }

    if !assessment.issues.is_empty() {
        report.push_str("\n## Issues Found\n");
        for issue in &assessment.issues {
            report.push_str(&format!("- {issue}\n"));
        }
    }

    if !assessment.recommendations.is_empty() {
        report.push_str("\n## Recommendations\n");
        for rec in &assessment.recommendations {
            report.push_str(&format!("- {rec}\n"));
        }
    }

    report
}

/// `code_quality` -> `Code Quality`.
fn title_case(category: &str) -> String {
    category
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::DeploymentReadinessScorer;

    #[test]
    fn report_carries_verdict_scores_and_issues() {
        let assessment = DeploymentReadinessScorer::new().assess("", "", "python");
        let report = readiness_report(&assessment);
        assert!(report.starts_with("# Deployment Readiness Assessment Report"));
        assert!(report.contains("- **Ready for Deployment**: ❌ No"));
        assert!(report.contains("- **Risk Level**: HIGH"));
        assert!(report.contains("- **Test Coverage**: ❌ 0.0/100"));
        assert!(report.contains("## Issues Found"));
        assert!(report.contains("## Recommendations"));
        assert!(report.contains("- No test functions found"));
    }

    #[test]
    fn clean_report_omits_empty_sections() {
        let code = concat!(
            "\"\"\"Ledger helpers.\n",
            "\n",
            "requirements: none\n",
            "\"\"\"\n",
            "\n",
            "import logging\n",
            "\n",
            "# module logger\n",
            "LOG = logging.getLogger(__name__)\n",
            "\n",
            "def total(entries):\n",
            "    \"\"\"Sum entries.\"\"\"\n",
            "    try:\n",
            "        return sum(entries)\n",
            "    except TypeError:\n",
            "        # swallow bad input\n",
            "        return 0\n",
        );
        let tests = concat!(
            "import pytest\n",
            "\n",
            "def test_total():\n",
            "    assert total([1]) == 1\n",
            "\n",
            "def test_total_empty():\n",
            "    assert total([]) == 0\n",
            "\n",
            "def test_total_none_error():\n",
            "    assert total(None) == 0\n",
        );
        let assessment = DeploymentReadinessScorer::new().assess(code, tests, "python");
        let report = readiness_report(&assessment);
        assert!(report.contains("- **Ready for Deployment**: ✅ Yes"));
        assert!(!report.contains("## Issues Found"));
        assert!(!report.contains("## Recommendations"));
    }

    #[test]
    fn categories_render_in_title_case() {
        assert_eq!(title_case("code_quality"), "Code Quality");
        assert_eq!(title_case("security"), "Security");
    }
}
