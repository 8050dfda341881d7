//! Category checks behind the deployment readiness score.
//!
//! Each check starts a category at 100, subtracts fixed penalties for the
//! patterns it finds, and floors at zero. Checks are lexical on purpose:
//! they run on generated text that may not parse, and they have to finish
//! in microseconds even on large files.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::analyzer::python_syntax_check;

/// Outcome of a single category check: the floored score plus the
/// human-readable findings that explain every deduction.
#[derive(Debug, Clone)]
pub(crate) struct SubScore {
    pub score: f64,
    pub findings: Vec<String>,
}

impl SubScore {
    fn clean() -> Self {
        SubScore {
            score: 100.0,
            findings: Vec::new(),
        }
    }

    fn deduct(&mut self, points: f64, finding: String) {
        self.score -= points;
        self.findings.push(finding);
    }

    fn floor(mut self) -> Self {
        self.score = self.score.max(0.0);
        self
    }
}

const LONG_LINE_LIMIT: usize = 88;

/// Code quality: line discipline, error handling, logging, docstrings.
/// Only Python code is inspected; other languages pass unchallenged.
pub(crate) fn code_quality(code: &str, language: &str) -> SubScore {
    let mut sub = SubScore::clean();
    if !language.eq_ignore_ascii_case("python") {
        return sub;
    }

    if let Err(_reason) = python_syntax_check(code) {
        return SubScore {
            score: 0.0,
            findings: vec!["Syntax errors found".to_string()],
        };
    }

    let lines: Vec<&str> = code.split('\n').collect();
    let long_lines = lines
        .iter()
        .filter(|line| line.trim().chars().count() > LONG_LINE_LIMIT)
        .count();
    if long_lines > 0 {
        sub.deduct(
            (long_lines as f64 / lines.len() as f64) * 20.0,
            format!("{long_lines} lines exceed 88 characters"),
        );
    }

    let todo_count = code.to_lowercase().matches("todo").count();
    if todo_count > 0 {
        sub.deduct(
            todo_count as f64 * 5.0,
            format!("{todo_count} TODO comments found"),
        );
    }

    if !code.contains("import ") && !code.contains("from ") {
        sub.deduct(10.0, "No imports found".to_string());
    }
    if !code.contains("try:") && !code.contains("except") {
        sub.deduct(15.0, "No error handling found".to_string());
    }
    if !code.contains("logging") && !code.contains("logger") {
        sub.deduct(10.0, "No logging configuration found".to_string());
    }
    if !code.contains("\"\"\"") && !code.contains("'''") {
        sub.deduct(15.0, "No docstrings found".to_string());
    }

    sub.floor()
}

/// Test coverage: framework, test function count, assertion discipline,
/// None and error path coverage. Python-only, like [`code_quality`].
pub(crate) fn test_coverage(tests: &str, language: &str) -> SubScore {
    let mut sub = SubScore::clean();
    if !language.eq_ignore_ascii_case("python") {
        return sub;
    }

    if !tests.contains("pytest") && !tests.contains("unittest") {
        sub.deduct(30.0, "No testing framework found".to_string());
    }

    let test_functions = tests.matches("def test_").count();
    if test_functions == 0 {
        sub.deduct(40.0, "No test functions found".to_string());
    } else if test_functions < 3 {
        sub.deduct(20.0, format!("Only {test_functions} test functions found"));
    }

    // Trailing space keeps `assertEqual` and friends out of the count.
    let assertions = tests.matches("assert ").count();
    if assertions == 0 {
        sub.deduct(30.0, "No assertions found".to_string());
    } else if assertions < test_functions {
        sub.deduct(15.0, "Some test functions lack assertions".to_string());
    }

    let lowered = tests.to_lowercase();
    if !lowered.contains("none") && !lowered.contains("null") {
        sub.deduct(10.0, "No null/None testing found".to_string());
    }
    if !lowered.contains("exception") && !lowered.contains("error") {
        sub.deduct(10.0, "No error/exception testing found".to_string());
    }

    sub.floor()
}

/// Substrings that flag risky calls or credential-looking identifiers.
const SECURITY_RISKS: [&str; 17] = [
    "eval(",
    "exec(",
    "__import__",
    "input(",
    "raw_input(",
    "os.system(",
    "subprocess.call(",
    "subprocess.Popen(",
    "pickle.loads(",
    "marshal.loads(",
    "yaml.load(",
    "sqlite3.connect(",
    "mysql.connector.connect(",
    "password",
    "secret",
    "key",
    "token",
];

static HARDCODED_PASSWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)password\s*=\s*["'][^"']+["']"#).expect("valid password regex")
});

static HARDCODED_API_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)api_key\s*=\s*["'][^"']+["']"#).expect("valid api key regex")
});

/// Security: denylisted calls, hardcoded credentials, query hygiene.
/// Applies to every language.
pub(crate) fn security(code: &str) -> SubScore {
    let mut sub = SubScore::clean();
    let lowered = code.to_lowercase();

    for risk in SECURITY_RISKS {
        if lowered.contains(risk) {
            sub.deduct(15.0, format!("Security risk: {risk}"));
        }
    }

    if HARDCODED_PASSWORD.is_match(code) {
        sub.deduct(25.0, "Hardcoded password detected".to_string());
    }
    if HARDCODED_API_KEY.is_match(code) {
        sub.deduct(25.0, "Hardcoded API key detected".to_string());
    }

    if lowered.contains("sql") && !code.contains('?') && !code.contains("%s") {
        sub.deduct(20.0, "Potential SQL injection risk".to_string());
    }

    if lowered.contains("input(") && !lowered.contains("validate") {
        sub.deduct(15.0, "Input validation missing".to_string());
    }

    sub.floor()
}

/// Anti-patterns reported by the performance check. The label is what
/// lands in the finding text; the regex is the matcher (dots and parens
/// escaped, nested-loop patterns kept as genuine same-line regexes).
static PERFORMANCE_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("for.*for", r"(?i)for.*for"),
        ("while.*while", r"(?i)while.*while"),
        ("time.sleep(", r"(?i)time\.sleep\("),
        ("threading.sleep(", r"(?i)threading\.sleep\("),
        ("requests.get(", r"(?i)requests\.get\("),
        ("urllib.request.urlopen(", r"(?i)urllib\.request\.urlopen\("),
        ("open(", r"(?i)open\("),
        ("file(", r"(?i)file\("),
    ]
    .into_iter()
    .map(|(label, pattern)| {
        (
            label,
            Regex::new(pattern).expect("valid performance pattern"),
        )
    })
    .collect()
});

/// Performance: blocking calls, same-line nested loops, leak-prone
/// globals. Applies to every language.
pub(crate) fn performance(code: &str) -> SubScore {
    let mut sub = SubScore::clean();

    for (label, pattern) in PERFORMANCE_PATTERNS.iter() {
        if pattern.is_match(code) {
            sub.deduct(10.0, format!("Performance issue: {label}"));
        }
    }

    if code.contains("global ") && !code.contains("del ") {
        sub.deduct(5.0, "Potential memory leak with global variables".to_string());
    }

    if code.contains("list(") && !code.contains("set(") {
        sub.deduct(5.0, "Consider using sets for unique collections".to_string());
    }

    sub.floor()
}

/// Documentation: module docstring, per-definition docstrings, inline
/// comment ratio, dependency notes. Applies to every language.
pub(crate) fn documentation(code: &str) -> SubScore {
    let mut sub = SubScore::clean();

    let trimmed = code.trim_start();
    if !trimmed.starts_with("\"\"\"") && !trimmed.starts_with("'''") {
        sub.deduct(20.0, "No module docstring found".to_string());
    }

    let function_count = code.matches("def ").count();
    let class_count = code.matches("class ").count();
    // Opening and closing markers both count, so a full docstring adds 2.
    let docstring_markers = code.matches("\"\"\"").count() + code.matches("'''").count();
    let expected = function_count + class_count + 1;
    if docstring_markers < expected {
        let shortfall = (expected - docstring_markers) as f64 / expected as f64;
        sub.deduct(
            30.0 * shortfall,
            format!("Insufficient docstrings: {docstring_markers}/{expected}"),
        );
    }

    let comment_lines = code
        .lines()
        .filter(|line| line.trim_start().starts_with('#'))
        .count();
    let code_lines = code
        .lines()
        .filter(|line| {
            let t = line.trim();
            !t.is_empty() && !t.starts_with('#')
        })
        .count();
    if code_lines > 0 && (comment_lines as f64 / code_lines as f64) < 0.1 {
        sub.deduct(15.0, "Insufficient inline comments".to_string());
    }

    let lowered = code.to_lowercase();
    if !lowered.contains("requirements") && !lowered.contains("dependencies") {
        sub.deduct(10.0, "No dependency information found".to_string());
    }

    sub.floor()
}
