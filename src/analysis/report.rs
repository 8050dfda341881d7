//! Human-readable rendering of analysis results.

use super::CodeAnalysis;

/// Render a markdown complexity report for one analyzed source.
pub fn complexity_report(analysis: &CodeAnalysis) -> String {
    let mut out = String::new();

    out.push_str("# Code Complexity Report\n\n");
    out.push_str(&format!("**Language:** {}\n", analysis.language));
    out.push_str(&format!(
        "**Complexity:** {} (score {})\n",
        analysis.complexity, analysis.metrics.complexity_score
    ));
    out.push_str(&format!(
        "**Quality score:** {:.1}/100\n\n",
        analysis.quality_score
    ));

    out.push_str("## Metrics\n\n");
    let metrics = &analysis.metrics;
    let rows = [
        ("Lines of code", metrics.lines_of_code),
        ("Characters", metrics.characters),
        ("Functions", metrics.functions),
        ("Classes", metrics.classes),
        ("Imports", metrics.imports),
        ("Variables", metrics.variables),
        ("Comments", metrics.comments),
        ("Docstrings", metrics.docstrings),
    ];
    out.push_str("| Metric | Value |\n|--------|-------|\n");
    for (name, value) in rows {
        out.push_str(&format!("| {} | {} |\n", name, value));
    }
    out.push('\n');

    if !analysis.structure.functions.is_empty() {
        out.push_str("## Functions\n\n");
        for function in &analysis.structure.functions {
            out.push_str(&format!(
                "- `{}({})` - {} lines\n",
                function.name,
                function.args.join(", "),
                function.line_count
            ));
        }
        out.push('\n');
    }

    if !analysis.structure.classes.is_empty() {
        out.push_str("## Classes\n\n");
        for class in &analysis.structure.classes {
            out.push_str(&format!(
                "- `{}` - {} methods, {} lines\n",
                class.name,
                class.methods.len(),
                class.line_count
            ));
        }
        out.push('\n');
    }

    if !analysis.issues.is_empty() {
        out.push_str("## Issues\n\n");
        for issue in &analysis.issues {
            out.push_str(&format!("- {}\n", issue));
        }
        out.push('\n');
    }

    if !analysis.suggestions.is_empty() {
        out.push_str("## Suggestions\n\n");
        for suggestion in &analysis.suggestions {
            out.push_str(&format!("- {}\n", suggestion));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StaticCodeAnalyzer;

    #[test]
    fn test_report_carries_headline_numbers() {
        let code = "\"\"\"Doc.\"\"\"\n\ndef f(x):\n    if x:\n        return 1\n    return 0\n";
        let analysis = StaticCodeAnalyzer::new().analyze(code, "python");
        let report = complexity_report(&analysis);

        assert!(report.starts_with("# Code Complexity Report"));
        assert!(report.contains("**Language:** python"));
        assert!(report.contains("score 2"));
        assert!(report.contains("`f(x)`"));
    }

    #[test]
    fn test_report_renders_degraded_analysis() {
        let analysis = StaticCodeAnalyzer::new().analyze("def broken(:(\n", "python");
        let report = complexity_report(&analysis);
        assert!(report.contains("Syntax error"));
    }
}
