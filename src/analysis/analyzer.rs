//! Lexical source scanner behind the analysis metrics.
//!
//! Python gets a structural line scan: function and class extents, branch
//! counting for the complexity estimate, docstring and comment tallies.
//! Other languages get regex name extraction and a neutral quality score.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    ClassInfo, CodeAnalysis, CodeMetrics, CodeStructure, ComplexityBand, FunctionInfo,
};

static PY_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\((.*)$").expect("valid def pattern")
});
static PY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)class\s+([A-Za-z_]\w*)").expect("valid class pattern"));
static PY_BRANCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:if|elif|while|except|(?:async\s+)?for)\b").expect("valid branch pattern")
});

static JS_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"function\s+([A-Za-z_$][\w$]*)|(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s*)?\(")
        .expect("valid js function pattern")
});
static JS_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"class\s+([A-Za-z_$][\w$]*)").expect("valid js class pattern"));
static RUST_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"fn\s+([A-Za-z_]\w*)").expect("valid rust fn pattern"));
static RUST_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:struct|enum|trait)\s+([A-Za-z_]\w*)").expect("valid rust type pattern")
});
static GO_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"func\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)").expect("valid go func pattern")
});
static JAVA_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:public|private|protected)[\w\s<>\[\],]*?\s([A-Za-z_]\w*)\s*\(")
        .expect("valid java method pattern")
});
static CLASS_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"class\s+([A-Za-z_]\w*)").expect("valid class keyword pattern"));

/// Thresholds that feed the quality score.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Body line count above which a function is considered too long.
    pub long_function_lines: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            long_function_lines: 20,
        }
    }
}

/// Heuristic source analyzer. Stateless apart from its thresholds.
#[derive(Debug, Clone, Default)]
pub struct StaticCodeAnalyzer {
    settings: AnalyzerSettings,
}

impl StaticCodeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    /// Analyze source text. Total: malformed input degrades, never panics.
    pub fn analyze(&self, code: &str, language: &str) -> CodeAnalysis {
        let language = language.to_lowercase();
        match language.as_str() {
            "python" | "py" => self.analyze_python(code),
            other => self.analyze_generic(code, other),
        }
    }

    fn analyze_python(&self, code: &str) -> CodeAnalysis {
        if let Err(reason) = python_syntax_check(code) {
            tracing::debug!("python scan degraded: {}", reason);
            return CodeAnalysis::degraded("python", reason);
        }

        let annotated = annotate(code);
        let lines = &annotated.lines;

        let lines_of_code = lines.iter().filter(|l| !l.trimmed.is_empty()).count();
        let comments = lines
            .iter()
            .filter(|l| !l.in_string && l.trimmed.starts_with('#'))
            .count();
        let docstrings = lines.iter().filter(|l| l.docstring_start).count();

        let imports = collect_imports(lines);
        let variables = lines
            .iter()
            .filter(|l| !l.in_string && !l.docstring_start && is_assignment(l.trimmed))
            .count();

        let scanned = collect_functions(lines);
        let classes = collect_classes(lines);
        let complexity_score: u32 = scanned.iter().map(|f| f.complexity).sum();

        let metrics = CodeMetrics {
            lines_of_code,
            characters: code.chars().count(),
            functions: scanned.len(),
            classes: classes.len(),
            imports: imports.len(),
            variables,
            comments,
            docstrings,
            complexity_score,
        };

        let quality_score = self.quality_score(&metrics, &scanned);
        let complexity = ComplexityBand::from_score(complexity_score);
        let (issues, suggestions) = self.assess(&metrics, &scanned, complexity);

        CodeAnalysis {
            language: "python".to_string(),
            metrics,
            structure: CodeStructure {
                functions: scanned.into_iter().map(|f| f.info).collect(),
                classes,
                imports,
            },
            complexity,
            quality_score,
            issues,
            suggestions,
        }
    }

    fn quality_score(&self, metrics: &CodeMetrics, functions: &[ScannedFunction]) -> f64 {
        let mut score: f64 = 100.0;

        if metrics.complexity_score > 20 {
            score -= 20.0;
        } else if metrics.complexity_score > 10 {
            score -= 10.0;
        }
        if metrics.docstrings == 0 {
            score -= 15.0;
        }
        if metrics.lines_of_code > 0 {
            let ratio = metrics.comments as f64 / metrics.lines_of_code as f64;
            if ratio < 0.1 {
                score -= 10.0;
            }
        }
        let long_functions = functions
            .iter()
            .filter(|f| f.info.line_count > self.settings.long_function_lines)
            .count();
        score -= 5.0 * long_functions as f64;

        score.max(0.0)
    }

    fn assess(
        &self,
        metrics: &CodeMetrics,
        functions: &[ScannedFunction],
        complexity: ComplexityBand,
    ) -> (Vec<String>, Vec<String>) {
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();

        if metrics.complexity_score > 10 {
            issues.push(format!("High complexity score: {}", metrics.complexity_score));
        }
        for function in functions {
            if function.info.line_count > self.settings.long_function_lines {
                issues.push(format!(
                    "Function '{}' has {} lines",
                    function.info.name, function.info.line_count
                ));
            }
        }
        if metrics.docstrings == 0 && metrics.lines_of_code > 0 {
            issues.push("No docstrings found".to_string());
        }

        if metrics.docstrings == 0 {
            suggestions.push("Add docstrings to modules, classes and functions".to_string());
        }
        if metrics.lines_of_code > 0
            && (metrics.comments as f64 / metrics.lines_of_code as f64) < 0.1
        {
            suggestions.push("Add comments to explain non-obvious logic".to_string());
        }
        if complexity == ComplexityBand::High {
            suggestions.push("Split complex functions into smaller units".to_string());
        }
        if issues.iter().any(|i| i.starts_with("Function '")) {
            suggestions.push("Break long functions into smaller helpers".to_string());
        }

        (issues, suggestions)
    }

    fn analyze_generic(&self, code: &str, language: &str) -> CodeAnalysis {
        let mut functions: Vec<String> = Vec::new();
        let mut classes: Vec<String> = Vec::new();
        let mut imports: Vec<String> = Vec::new();

        match language {
            "javascript" | "typescript" | "js" | "ts" => {
                for caps in JS_FUNCTION.captures_iter(code) {
                    if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
                        functions.push(name.as_str().to_string());
                    }
                }
                classes.extend(capture_names(&JS_CLASS, code));
                imports.extend(
                    code.lines()
                        .map(str::trim)
                        .filter(|l| l.starts_with("import ") || l.contains("require("))
                        .map(|l| l.to_string()),
                );
            }
            "rust" | "rs" => {
                functions.extend(capture_names(&RUST_FUNCTION, code));
                classes.extend(capture_names(&RUST_TYPE, code));
                imports.extend(
                    code.lines()
                        .map(str::trim)
                        .filter(|l| l.starts_with("use "))
                        .map(|l| l.to_string()),
                );
            }
            "go" => {
                functions.extend(capture_names(&GO_FUNCTION, code));
                imports.extend(
                    code.lines()
                        .map(str::trim)
                        .filter(|l| l.starts_with("import"))
                        .map(|l| l.to_string()),
                );
            }
            "java" | "c#" | "csharp" => {
                functions.extend(capture_names(&JAVA_METHOD, code));
                classes.extend(capture_names(&CLASS_KEYWORD, code));
            }
            _ => {}
        }

        let metrics = CodeMetrics {
            lines_of_code: code.lines().filter(|l| !l.trim().is_empty()).count(),
            characters: code.chars().count(),
            functions: functions.len(),
            classes: classes.len(),
            imports: imports.len(),
            ..CodeMetrics::default()
        };

        CodeAnalysis {
            language: language.to_string(),
            metrics,
            structure: CodeStructure {
                functions: functions
                    .into_iter()
                    .map(|name| FunctionInfo {
                        name,
                        args: Vec::new(),
                        line_count: 0,
                    })
                    .collect(),
                classes: classes
                    .into_iter()
                    .map(|name| ClassInfo {
                        name,
                        methods: Vec::new(),
                        line_count: 0,
                    })
                    .collect(),
                imports,
            },
            complexity: ComplexityBand::Low,
            quality_score: 50.0,
            issues: Vec::new(),
            suggestions: vec![format!(
                "Structural metrics for {} are regex-based; python input gets the full scan",
                language
            )],
        }
    }
}

fn capture_names(pattern: &Regex, code: &str) -> Vec<String> {
    pattern
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Map a file extension onto the analyzer's language tag.
pub fn detect_language_from_path(path: &std::path::Path) -> String {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "py" => "python".to_string(),
        "rs" => "rust".to_string(),
        "js" => "javascript".to_string(),
        "ts" => "typescript".to_string(),
        "java" => "java".to_string(),
        "cs" => "c#".to_string(),
        "go" => "go".to_string(),
        "rb" => "ruby".to_string(),
        "cpp" | "cc" | "cxx" => "cpp".to_string(),
        "c" => "c".to_string(),
        _ => "unknown".to_string(),
    }
}

struct AnnotatedSource<'a> {
    lines: Vec<Line<'a>>,
    unterminated_string: bool,
}

struct Line<'a> {
    raw: &'a str,
    trimmed: &'a str,
    indent: usize,
    /// Line lies inside (or closes) a triple-quoted block.
    in_string: bool,
    /// Line opens a standalone string statement, i.e. a docstring.
    docstring_start: bool,
}

fn annotate(code: &str) -> AnnotatedSource<'_> {
    let mut lines = Vec::new();
    let mut in_triple: Option<&'static str> = None;

    for raw in code.lines() {
        let trimmed = raw.trim();
        let indent = raw.len() - raw.trim_start().len();

        if let Some(marker) = in_triple {
            if trimmed.contains(marker) {
                in_triple = None;
            }
            lines.push(Line {
                raw,
                trimmed,
                indent,
                in_string: true,
                docstring_start: false,
            });
            continue;
        }

        let (docstring_start, opened) = classify_string_start(trimmed);
        in_triple = opened;
        lines.push(Line {
            raw,
            trimmed,
            indent,
            in_string: false,
            docstring_start,
        });
    }

    AnnotatedSource {
        lines,
        unterminated_string: in_triple.is_some(),
    }
}

/// Returns whether the line opens a docstring, and the marker of a
/// triple-quoted block it leaves open.
fn classify_string_start(trimmed: &str) -> (bool, Option<&'static str>) {
    for marker in ["\"\"\"", "'''"] {
        let count = trimmed.matches(marker).count();
        if count == 0 {
            continue;
        }
        let is_docstring = trimmed.starts_with(marker);
        let left_open = count % 2 == 1;
        return (is_docstring, if left_open { Some(marker) } else { None });
    }
    (false, None)
}

/// Lexical plausibility check: unterminated triple quotes, unbalanced
/// brackets outside strings, `def`/`class` lines missing their colon.
pub(crate) fn python_syntax_check(code: &str) -> Result<(), String> {
    let annotated = annotate(code);
    if annotated.unterminated_string {
        return Err("unterminated triple-quoted string".to_string());
    }

    let mut depth: i64 = 0;
    for line in &annotated.lines {
        if line.in_string || line.docstring_start {
            continue;
        }
        let code_part = code_portion(line.trimmed);
        for c in code_part.chars() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err("unbalanced brackets".to_string());
                    }
                }
                _ => {}
            }
        }
        let is_block_header = PY_DEF.is_match(line.raw) || PY_CLASS.is_match(line.raw);
        if is_block_header && depth == 0 {
            let tail = code_part.trim_end();
            if !tail.ends_with(':') && !tail.ends_with('\\') {
                return Err(format!("missing ':' on block header '{}'", line.trimmed));
            }
        }
    }
    if depth != 0 {
        return Err("unbalanced brackets".to_string());
    }
    Ok(())
}

/// The non-string, non-comment portion of a line.
fn code_portion(trimmed: &str) -> String {
    let mut out = String::with_capacity(trimmed.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in trimmed.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '#' => break,
            other => out.push(other),
        }
    }
    out
}

fn collect_imports(lines: &[Line<'_>]) -> Vec<String> {
    let mut imports = Vec::new();
    for line in lines.iter().filter(|l| !l.in_string) {
        if let Some(rest) = line.trimmed.strip_prefix("import ") {
            for part in rest.split(',') {
                if let Some(name) = part.trim().split_whitespace().next() {
                    imports.push(name.to_string());
                }
            }
        } else if let Some(rest) = line.trimmed.strip_prefix("from ") {
            if let Some(module) = rest.split_whitespace().next() {
                imports.push(module.to_string());
            }
        }
    }
    imports
}

const STATEMENT_KEYWORDS: [&str; 11] = [
    "if ", "elif ", "while ", "for ", "def ", "class ", "import ", "from ", "return ", "assert ",
    "with ",
];

fn is_assignment(trimmed: &str) -> bool {
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }
    if STATEMENT_KEYWORDS.iter().any(|k| trimmed.starts_with(k)) {
        return false;
    }
    let bytes = trimmed.as_bytes();
    let Some(pos) = trimmed.find('=') else {
        return false;
    };
    if pos == 0 || bytes.get(pos + 1) == Some(&b'=') {
        return false;
    }
    !matches!(
        bytes[pos - 1],
        b'+' | b'-' | b'*' | b'/' | b'%' | b'&' | b'|' | b'^' | b'<' | b'>' | b'!' | b':' | b'='
    )
}

struct ScannedFunction {
    info: FunctionInfo,
    complexity: u32,
}

/// Every `def` at any nesting level, the way an AST walk would list them.
fn collect_functions(lines: &[Line<'_>]) -> Vec<ScannedFunction> {
    let mut found = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if line.in_string {
            continue;
        }
        let Some(caps) = PY_DEF.captures(line.raw) else {
            continue;
        };
        let indent = caps[1].len();
        let name = caps[2].to_string();
        let args = parse_args(&caps[3]);
        let body = body_span(lines, i, indent);

        let line_count = body.iter().filter(|l| !l.trimmed.is_empty()).count();
        let branches = body
            .iter()
            .filter(|l| !l.in_string && PY_BRANCH.is_match(l.raw))
            .count() as u32;
        let bool_ops: u32 = body
            .iter()
            .filter(|l| !l.in_string && !l.docstring_start && !l.trimmed.starts_with('#'))
            .map(|l| {
                (l.trimmed.matches(" and ").count() + l.trimmed.matches(" or ").count()) as u32
            })
            .sum();

        found.push(ScannedFunction {
            info: FunctionInfo {
                name,
                args,
                line_count,
            },
            complexity: 1 + branches + bool_ops,
        });
    }

    found
}

fn collect_classes(lines: &[Line<'_>]) -> Vec<ClassInfo> {
    let mut found = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if line.in_string {
            continue;
        }
        let Some(caps) = PY_CLASS.captures(line.raw) else {
            continue;
        };
        let indent = caps[1].len();
        let name = caps[2].to_string();
        let body = body_span(lines, i, indent);

        let body_indent = body
            .iter()
            .find(|l| !l.trimmed.is_empty() && !l.in_string)
            .map(|l| l.indent);
        let methods = body
            .iter()
            .filter(|l| !l.in_string && Some(l.indent) == body_indent)
            .filter_map(|l| PY_DEF.captures(l.raw))
            .map(|caps| caps[2].to_string())
            .collect();

        found.push(ClassInfo {
            name,
            methods,
            line_count: body.iter().filter(|l| !l.trimmed.is_empty()).count(),
        });
    }

    found
}

/// Indented block following a header line: runs until the first non-blank
/// line at or below the header's indent, string content included.
fn body_span<'a, 'b>(lines: &'b [Line<'a>], header: usize, indent: usize) -> &'b [Line<'a>] {
    let start = header + 1;
    let mut end = start;
    while end < lines.len() {
        let line = &lines[end];
        if !line.in_string && !line.trimmed.is_empty() && line.indent <= indent {
            break;
        }
        end += 1;
    }
    &lines[start..end]
}

fn parse_args(raw: &str) -> Vec<String> {
    let cut = raw.rfind(')').map(|i| &raw[..i]).unwrap_or(raw);
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in cut.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                push_arg(&mut args, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_arg(&mut args, &current);
    args
}

fn push_arg(args: &mut Vec<String>, piece: &str) {
    let name = piece
        .split(|c| c == ':' || c == '=')
        .next()
        .unwrap_or("")
        .trim()
        .trim_start_matches('*')
        .trim();
    if !name.is_empty() {
        args.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn analyzer() -> StaticCodeAnalyzer {
        StaticCodeAnalyzer::new()
    }

    const DOCUMENTED_SAMPLE: &str = r#""""Utility module."""

def process(value):
    """Process a value."""
    if value > 0:
        return value
    return 0
"#;

    #[test]
    fn test_documented_single_branch_function() {
        let analysis = analyzer().analyze(DOCUMENTED_SAMPLE, "python");

        assert_eq!(analysis.metrics.complexity_score, 2);
        assert_eq!(analysis.complexity, ComplexityBand::Low);
        assert_eq!(analysis.quality_score, 90.0);
        assert_eq!(analysis.metrics.docstrings, 2);
        assert_eq!(analysis.metrics.functions, 1);
        assert_eq!(analysis.structure.functions[0].name, "process");
        assert_eq!(analysis.structure.functions[0].args, vec!["value"]);
    }

    fn function_with_branches(n: usize) -> String {
        let mut code = String::from("def f(x):\n");
        for i in 0..n {
            code.push_str(&format!("    if x > {}:\n        x -= 1\n", i));
        }
        code.push_str("    return x\n");
        code
    }

    #[test]
    fn test_complexity_band_edges_from_source() {
        // 1 + n branches
        let low = analyzer().analyze(&function_with_branches(4), "python");
        assert_eq!(low.metrics.complexity_score, 5);
        assert_eq!(low.complexity, ComplexityBand::Low);

        let medium = analyzer().analyze(&function_with_branches(5), "python");
        assert_eq!(medium.metrics.complexity_score, 6);
        assert_eq!(medium.complexity, ComplexityBand::Medium);

        let upper_medium = analyzer().analyze(&function_with_branches(9), "python");
        assert_eq!(upper_medium.metrics.complexity_score, 10);
        assert_eq!(upper_medium.complexity, ComplexityBand::Medium);

        let high = analyzer().analyze(&function_with_branches(10), "python");
        assert_eq!(high.metrics.complexity_score, 11);
        assert_eq!(high.complexity, ComplexityBand::High);
    }

    #[test]
    fn test_boolean_operators_raise_complexity() {
        let code = "def f(a, b, c):\n    if a and b or c:\n        return 1\n    return 0\n";
        let analysis = analyzer().analyze(code, "python");
        // 1 + if + and + or
        assert_eq!(analysis.metrics.complexity_score, 4);
    }

    #[test]
    fn test_counts_imports_variables_comments() {
        let code = "import os\nimport sys, json\nfrom pathlib import Path\n\n# setup\nname = \"demo\"\ncount = 3\ncount += 1\n";
        let analysis = analyzer().analyze(code, "python");

        assert_eq!(analysis.metrics.imports, 4);
        assert_eq!(
            analysis.structure.imports,
            vec!["os", "sys", "json", "pathlib"]
        );
        assert_eq!(analysis.metrics.comments, 1);
        // augmented assignment is not an assignment statement
        assert_eq!(analysis.metrics.variables, 2);
    }

    #[test]
    fn test_class_methods_and_nested_functions() {
        let code = r#"class Greeter:
    def __init__(self, name):
        self.name = name

    def greet(self):
        return self.name
"#;
        let analysis = analyzer().analyze(code, "python");

        assert_eq!(analysis.metrics.classes, 1);
        assert_eq!(analysis.structure.classes[0].name, "Greeter");
        assert_eq!(
            analysis.structure.classes[0].methods,
            vec!["__init__", "greet"]
        );
        // methods are functions too
        assert_eq!(analysis.metrics.functions, 2);
    }

    #[test]
    fn test_string_assignment_is_not_a_docstring() {
        let code = "template = \"\"\"\nnot a docstring\n\"\"\"\n";
        let analysis = analyzer().analyze(code, "python");
        assert_eq!(analysis.metrics.docstrings, 0);
    }

    #[test]
    fn test_unbalanced_brackets_degrade() {
        let analysis = analyzer().analyze("def broken(:\n    return (1\n", "python");
        assert_eq!(analysis.quality_score, 0.0);
        assert_eq!(analysis.metrics, CodeMetrics::default());
        assert!(analysis.issues[0].starts_with("Syntax error"));
    }

    #[test]
    fn test_missing_colon_degrades() {
        let analysis = analyzer().analyze("def f()\n    return 1\n", "python");
        assert!(analysis.issues[0].starts_with("Syntax error"));
    }

    #[test]
    fn test_unterminated_docstring_degrades() {
        let analysis = analyzer().analyze("\"\"\"open forever\n\ndef f():\n    pass\n", "python");
        assert!(analysis.issues[0].contains("unterminated"));
    }

    #[test]
    fn test_long_function_penalty() {
        let mut code = String::from("\"\"\"Doc.\"\"\"\n\ndef long_one():\n");
        for i in 0..25 {
            code.push_str(&format!("    x{} = {}\n", i, i));
        }
        code.push_str("    return 0\n");
        // plenty of comments to avoid the ratio penalty
        for _ in 0..10 {
            code.push_str("# note\n");
        }

        let analysis = analyzer().analyze(&code, "python");
        assert_eq!(analysis.quality_score, 95.0);
        assert!(analysis
            .issues
            .iter()
            .any(|i| i.contains("'long_one'")));
    }

    #[test]
    fn test_generic_javascript_extraction() {
        let code = "import express from 'express';\nfunction handler(req, res) {}\nconst helper = (x) => x;\nclass Router {}\n";
        let analysis = analyzer().analyze(code, "javascript");

        assert_eq!(analysis.quality_score, 50.0);
        assert_eq!(analysis.complexity, ComplexityBand::Low);
        let names: Vec<&str> = analysis
            .structure
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert!(names.contains(&"handler"));
        assert_eq!(analysis.structure.classes[0].name, "Router");
        assert_eq!(analysis.metrics.imports, 1);
    }

    #[test]
    fn test_generic_rust_extraction() {
        let code = "use std::fmt;\n\nstruct Point;\n\nfn origin() -> Point {\n    Point\n}\n";
        let analysis = analyzer().analyze(code, "rust");
        assert_eq!(analysis.metrics.functions, 1);
        assert_eq!(analysis.metrics.classes, 1);
    }

    #[test]
    fn test_language_detection_from_path() {
        use std::path::Path;
        assert_eq!(detect_language_from_path(Path::new("a/b/app.py")), "python");
        assert_eq!(detect_language_from_path(Path::new("lib.rs")), "rust");
        assert_eq!(detect_language_from_path(Path::new("index.ts")), "typescript");
        assert_eq!(detect_language_from_path(Path::new("README")), "unknown");
    }

    #[test]
    fn test_default_args_and_annotations_parse() {
        let code = "def configure(host: str = \"localhost\", *args, **kwargs):\n    return host\n";
        let analysis = analyzer().analyze(code, "python");
        assert_eq!(
            analysis.structure.functions[0].args,
            vec!["host", "args", "kwargs"]
        );
    }
}
