//! Test Scaffold Generation
//!
//! Turns a [`CodeAnalysis`] into an inert pytest-style skeleton: one test
//! class per analyzed class, one test function per free function. Bodies are
//! deliberately empty. No model is involved, so the output is deterministic
//! and safe to regenerate.

use super::CodeAnalysis;

/// Generates pytest-style test skeletons from analysis results.
#[derive(Debug, Clone, Default)]
pub struct TestScaffoldGenerator;

impl TestScaffoldGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Build the scaffold source for `module_name` (import target, no `.py`).
    pub fn generate(&self, analysis: &CodeAnalysis, module_name: &str) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "\"\"\"Test scaffold generated from static analysis of {}.\"\"\"\n\n",
            module_name
        ));
        out.push_str("import pytest\n\n");
        out.push_str(&format!("from {} import *\n", module_name));

        let method_names: Vec<&str> = analysis
            .structure
            .classes
            .iter()
            .flat_map(|c| c.methods.iter().map(String::as_str))
            .collect();

        for class in &analysis.structure.classes {
            out.push_str(&format!("\n\nclass Test{}:\n", class.name));
            out.push_str(&format!(
                "    \"\"\"Tests for the {} class.\"\"\"\n\n",
                class.name
            ));
            out.push_str("    def setup_method(self):\n");
            out.push_str("        \"\"\"Prepare a fresh instance for each test.\"\"\"\n");
            out.push_str("        pass\n");

            for method in class.methods.iter().filter(|m| !m.starts_with("__")) {
                out.push_str(&format!("\n    def test_{}(self):\n", method));
                out.push_str(&format!(
                    "        \"\"\"TODO: exercise {}.{}.\"\"\"\n",
                    class.name, method
                ));
                out.push_str("        pass\n");
            }
        }

        let free_functions: Vec<&str> = analysis
            .structure
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .filter(|name| !name.starts_with("__") && !method_names.contains(name))
            .collect();

        for name in &free_functions {
            out.push_str(&format!("\n\ndef test_{}():\n", name));
            out.push_str(&format!(
                "    \"\"\"TODO: exercise {} with a typical input.\"\"\"\n",
                name
            ));
            out.push_str("    pass\n");
            out.push_str(&format!("\n\ndef test_{}_invalid_input():\n", name));
            out.push_str(&format!(
                "    \"\"\"TODO: exercise {} with invalid input.\"\"\"\n",
                name
            ));
            out.push_str("    pass\n");
        }

        if analysis.structure.classes.is_empty() && free_functions.is_empty() {
            out.push_str("\n\ndef test_module_imports():\n");
            out.push_str("    \"\"\"TODO: check that the module imports cleanly.\"\"\"\n");
            out.push_str("    pass\n");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StaticCodeAnalyzer;

    fn scaffold_for(code: &str) -> String {
        let analysis = StaticCodeAnalyzer::new().analyze(code, "python");
        TestScaffoldGenerator::new().generate(&analysis, "sample")
    }

    #[test]
    fn test_scaffold_covers_classes_and_functions() {
        let code = r#"class Greeter:
    def __init__(self):
        pass

    def greet(self):
        return "hi"

def standalone(x):
    return x
"#;
        let scaffold = scaffold_for(code);

        assert!(scaffold.contains("import pytest"));
        assert!(scaffold.contains("from sample import *"));
        assert!(scaffold.contains("class TestGreeter:"));
        assert!(scaffold.contains("def setup_method(self):"));
        assert!(scaffold.contains("def test_greet(self):"));
        assert!(!scaffold.contains("def test___init__"));
        assert!(scaffold.contains("def test_standalone():"));
        assert!(scaffold.contains("def test_standalone_invalid_input():"));
    }

    #[test]
    fn test_methods_not_duplicated_as_free_functions() {
        let code = "class A:\n    def run(self):\n        pass\n";
        let scaffold = scaffold_for(code);
        assert!(scaffold.contains("def test_run(self):"));
        assert!(!scaffold.contains("def test_run():"));
    }

    #[test]
    fn test_empty_module_gets_placeholder() {
        let scaffold = scaffold_for("x = 1\n");
        assert!(scaffold.contains("def test_module_imports():"));
    }

    #[test]
    fn test_scaffold_is_deterministic() {
        let code = "def a():\n    pass\n\ndef b():\n    pass\n";
        assert_eq!(scaffold_for(code), scaffold_for(code));
    }
}
