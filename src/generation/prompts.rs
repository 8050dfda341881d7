//! Prompt construction for every generation kind.
//!
//! Builders are pure string functions. Each prompt states the role, the
//! exact output contract, and embeds a JSON example that must itself be
//! valid JSON, so the extractor can be pointed at a prompt in tests and
//! recover the example unchanged.

use super::models::TechStackOption;

fn strict_json_rules(shape_word: &str) -> String {
    format!(
        "CRITICAL: You must respond with ONLY a valid JSON {shape_word}. Follow these rules:\n\
         - Use proper JSON syntax with commas between all array elements\n\
         - Use proper JSON syntax with commas between all object properties\n\
         - No trailing commas\n\
         - No additional text, explanations, or markdown formatting\n\
         - Ensure all strings are properly quoted\n\
         - Ensure all brackets and braces are properly closed"
    )
}

pub(crate) const TECH_STACK_EXAMPLE: &str = r#"[
    {
        "id": 1,
        "name": "Tech Stack Name",
        "language": "Programming Language",
        "framework": "Main Framework",
        "database": "Database Type",
        "dependencies": ["list", "of", "dependencies"],
        "tools": ["development", "tools"],
        "deployment": "Deployment method",
        "pros": ["pro1", "pro2", "pro3"],
        "cons": ["con1", "con2"],
        "complexity": "Beginner/Intermediate/Advanced",
        "estimated_time": "time estimate",
        "best_use_case": "When to use this stack"
    },
    {
        "id": 2,
        "name": "Tech Stack Name 2",
        "language": "Programming Language 2",
        "framework": "Main Framework 2",
        "database": "Database Type 2",
        "dependencies": ["list", "of", "dependencies"],
        "tools": ["development", "tools"],
        "deployment": "Deployment method",
        "pros": ["pro1", "pro2", "pro3"],
        "cons": ["con1", "con2"],
        "complexity": "Beginner/Intermediate/Advanced",
        "estimated_time": "time estimate",
        "best_use_case": "When to use this stack"
    },
    {
        "id": 3,
        "name": "Tech Stack Name 3",
        "language": "Programming Language 3",
        "framework": "Main Framework 3",
        "database": "Database Type 3",
        "dependencies": ["list", "of", "dependencies"],
        "tools": ["development", "tools"],
        "deployment": "Deployment method",
        "pros": ["pro1", "pro2", "pro3"],
        "cons": ["con1", "con2"],
        "complexity": "Beginner/Intermediate/Advanced",
        "estimated_time": "time estimate",
        "best_use_case": "When to use this stack"
    }
]"#;

/// Ask for exactly three stack options as a JSON array.
pub fn tech_stack_prompt(requirement: &str) -> String {
    format!(
        "You are a technical architect. Analyze the following requirement and suggest \
         exactly 3 different technology stack options.\n\n\
         Requirement: {requirement}\n\n\
         For each tech stack option, provide:\n\
         1. Programming language (with version)\n\
         2. Framework(s)\n\
         3. Database (if needed)\n\
         4. Additional libraries and dependencies\n\
         5. Development tools\n\
         6. Deployment considerations\n\
         7. Pros and cons\n\
         8. Complexity level (Beginner/Intermediate/Advanced)\n\
         9. Estimated development time\n\
         10. Best use case\n\n\
         {rules}\n\n\
         Example format:\n{TECH_STACK_EXAMPLE}",
        rules = strict_json_rules("array"),
    )
}

pub(crate) const STRUCTURE_EXAMPLE: &str = r#"{
    "success": true,
    "project_name": "suggested project name",
    "structure": {
        "root_files": ["file1", "file2", "file3"],
        "directories": {
            "src/": ["main.py", "config.py", "utils.py"],
            "tests/": ["test_main.py", "test_utils.py"],
            "docs/": ["README.md", "API.md"],
            "config/": ["settings.py", "database.py"],
            "scripts/": ["deploy.sh", "setup.py"]
        }
    },
    "dependencies": {
        "main": ["dependency1", "dependency2"],
        "dev": ["dev-dependency1", "dev-dependency2"],
        "test": ["test-dependency1", "test-dependency2"]
    },
    "description": "Brief project description"
}"#;

/// Ask for a full project layout for the selected stack.
pub fn project_structure_prompt(requirement: &str, stack: &TechStackOption) -> String {
    format!(
        "You are a software architect. Based on the selected tech stack and requirements, \
         generate a detailed project file structure.\n\n\
         Selected tech stack: {stack}\n\
         Requirements: {requirement}\n\n\
         Create a comprehensive project structure including:\n\
         1. Directory structure with all necessary folders\n\
         2. File names and their purposes\n\
         3. Configuration files needed\n\
         4. Dependencies and requirements files\n\
         5. Documentation files\n\
         6. Testing structure\n\
         7. Deployment files\n\n\
         {rules}\n\n\
         Example format:\n{STRUCTURE_EXAMPLE}\n\n\
         Remember: every array element must be separated by commas, and every object \
         property must be separated by commas.",
        stack = stack.summary(),
        rules = strict_json_rules("object"),
    )
}

pub(crate) const MAIN_FILES_EXAMPLE: &str = r#"{
    "success": true,
    "files": {
        "main.py": "complete main application code",
        "config.py": "complete configuration code",
        "utils.py": "complete utility functions",
        "models.py": "database models if needed",
        "api.py": "API endpoints if needed",
        "constants.py": "constants and settings",
        "logger.py": "logging configuration",
        "requirements.txt": "dependencies list",
        "README.md": "project documentation",
        ".env.example": "environment variables template",
        "Dockerfile": "container configuration if needed",
        "docker-compose.yml": "docker compose if needed"
    }
}"#;

/// Ask for the main application files of the structure.
pub fn main_files_prompt(requirement: &str, structure_json: &str) -> String {
    format!(
        "Based on the project structure and requirements, generate ALL the main \
         application files.\n\n\
         Project structure: {structure_json}\n\
         Requirements: {requirement}\n\n\
         Generate a complete implementation for every file with proper imports, error \
         handling, documentation and docstrings, type hints where applicable, \
         configuration management, and logging setup.\n\n\
         {rules}\n\n\
         Example format:\n{MAIN_FILES_EXAMPLE}\n\n\
         Generate ALL files that would be needed for a complete, production-ready project.",
        rules = strict_json_rules("object"),
    )
}

pub(crate) const TEST_FILES_EXAMPLE: &str = r#"{
    "success": true,
    "test_files": {
        "test_main.py": "main application tests",
        "test_utils.py": "utility function tests",
        "test_models.py": "database model tests",
        "test_api.py": "API endpoint tests",
        "test_config.py": "configuration tests",
        "test_integration.py": "integration tests",
        "conftest.py": "pytest configuration and fixtures",
        "test_requirements.txt": "test dependencies"
    }
}"#;

/// Ask for the test files of the structure. Independent of the main-file
/// request so the two can be issued concurrently.
pub fn test_files_prompt(requirement: &str, structure_json: &str) -> String {
    format!(
        "Generate comprehensive test files for ALL components of the project.\n\n\
         Project structure: {structure_json}\n\
         Requirements: {requirement}\n\n\
         Create test files covering unit tests for all functions and classes, \
         integration tests, fixtures and mocks, edge cases, and error scenarios.\n\n\
         {rules}\n\n\
         Example format:\n{TEST_FILES_EXAMPLE}\n\n\
         Generate tests for ALL files in the project structure.",
        rules = strict_json_rules("object"),
    )
}

pub(crate) const ADDITIONAL_FILES_EXAMPLE: &str = r#"{
    "success": true,
    "additional_files": {
        "requirements.txt": "complete dependency list",
        "README.md": "comprehensive documentation",
        ".env.example": "environment variables",
        ".gitignore": "git ignore patterns",
        "setup.py": "package configuration",
        "Dockerfile": "container configuration",
        "docker-compose.yml": "docker compose setup",
        "Makefile": "build commands",
        "scripts/deploy.sh": "deployment script",
        "docs/API.md": "API documentation"
    }
}"#;

/// Ask for the auxiliary project files (docs, packaging, deployment).
pub fn additional_files_prompt(requirement: &str, structure_json: &str) -> String {
    format!(
        "Generate additional project files for a complete, production-ready project.\n\n\
         Project structure: {structure_json}\n\
         Requirements: {requirement}\n\n\
         Generate dependency manifests, project documentation, environment templates, \
         ignore files, packaging configuration, container setup, and deployment \
         scripts as appropriate for the stack.\n\n\
         {rules}\n\n\
         Example format:\n{ADDITIONAL_FILES_EXAMPLE}",
        rules = strict_json_rules("object"),
    )
}

/// Ask for a complete test module for one existing source file. The reply
/// is code text, not JSON.
pub fn test_generation_prompt(filename: &str, code: &str, language: &str) -> String {
    format!(
        "You are a test engineer. Write a complete {language} test module for the \
         file below.\n\n\
         File: {filename}\n\
         ```\n{code}\n```\n\n\
         Cover every public function and class with at least one normal-case test and \
         one invalid-input test. Include assertions, None/error-path coverage, and any \
         fixtures the tests need.\n\n\
         Return ONLY the test code. No markdown fences, no explanations."
    )
}

/// Prefix document-derived context ahead of the requirement.
pub fn combine_requirement(document_text: &str, requirement: &str) -> String {
    let document = document_text.trim();
    let requirement = requirement.trim();
    match (document.is_empty(), requirement.is_empty()) {
        (false, false) => format!(
            "Additional Context from Document:\n{document}\n\nSpecific Requirements:\n{requirement}"
        ),
        (false, true) => document.to_string(),
        _ => requirement.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_json, JsonShape};
    use crate::generation::fallback::fallback_tech_stacks;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn embedded_examples_are_valid_json() {
        for example in [
            TECH_STACK_EXAMPLE,
            STRUCTURE_EXAMPLE,
            MAIN_FILES_EXAMPLE,
            TEST_FILES_EXAMPLE,
            ADDITIONAL_FILES_EXAMPLE,
        ] {
            serde_json::from_str::<Value>(example).expect("example must parse");
        }
    }

    #[test]
    fn extractor_recovers_the_example_from_each_prompt() {
        let requirement = "Build a task tracker with a REST API";
        let stack = &fallback_tech_stacks()[0];
        // Brace-free stand-in so the first bracket in the prompt is the example's.
        let structure_json = "structure omitted";

        let array_prompt = tech_stack_prompt(requirement);
        let value = extract_json(&array_prompt, JsonShape::Array).expect("array example");
        assert_eq!(value.as_array().map(Vec::len), Some(3));

        for prompt in [
            project_structure_prompt(requirement, stack),
            main_files_prompt(requirement, structure_json),
            test_files_prompt(requirement, structure_json),
            additional_files_prompt(requirement, structure_json),
        ] {
            let value = extract_json(&prompt, JsonShape::Object).expect("object example");
            assert!(value.is_object());
        }
    }

    #[test]
    fn prompts_carry_their_inputs() {
        let prompt = tech_stack_prompt("inventory service for a warehouse");
        assert!(prompt.contains("inventory service for a warehouse"));
        assert!(prompt.contains("exactly 3"));

        let prompt = main_files_prompt("demo requirement", "{\"success\": true}");
        assert!(prompt.contains("demo requirement"));
        assert!(prompt.contains("{\"success\": true}"));
    }

    #[test]
    fn test_generation_prompt_embeds_the_source() {
        let prompt = test_generation_prompt("billing.py", "def charge():\n    pass", "python");
        assert!(prompt.contains("billing.py"));
        assert!(prompt.contains("def charge()"));
        assert!(prompt.contains("ONLY the test code"));
    }

    #[test]
    fn combine_prefixes_document_context() {
        let combined = combine_requirement("spec excerpt", "build the parser");
        assert!(combined.starts_with("Additional Context from Document:\nspec excerpt"));
        assert!(combined.ends_with("Specific Requirements:\nbuild the parser"));

        assert_eq!(combine_requirement("", "build it now"), "build it now");
        assert_eq!(combine_requirement("doc only", ""), "doc only");
        assert_eq!(combine_requirement("  ", "  "), "");
    }
}
