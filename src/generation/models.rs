//! Typed models for the generation pipeline.
//!
//! Model responses arrive as loosely-shaped JSON. The converters here are
//! deliberately lenient: missing fields get documented defaults, lone
//! strings are accepted where arrays are expected, and entries that lack
//! the one mandatory field (`name`) are dropped rather than failing the
//! whole set. Anything that survives conversion is fully populated.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stack difficulty as advertised to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComplexityRating {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl ComplexityRating {
    /// Lenient parse; unrecognized text lands on `Intermediate`.
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        if lowered.starts_with("begin") {
            ComplexityRating::Beginner
        } else if lowered.starts_with("adv") {
            ComplexityRating::Advanced
        } else {
            ComplexityRating::Intermediate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityRating::Beginner => "Beginner",
            ComplexityRating::Intermediate => "Intermediate",
            ComplexityRating::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for ComplexityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template family a stack maps onto. Decided once when the option is
/// built, so downstream consumers branch on the tag instead of re-matching
/// name substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackFamily {
    DjangoLike,
    NodeLike,
    #[default]
    Generic,
}

impl StackFamily {
    pub fn classify(stack_name: &str) -> Self {
        let lowered = stack_name.to_lowercase();
        if lowered.contains("django") {
            StackFamily::DjangoLike
        } else if lowered.contains("react") || lowered.contains("node") {
            StackFamily::NodeLike
        } else {
            StackFamily::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StackFamily::DjangoLike => "django",
            StackFamily::NodeLike => "node",
            StackFamily::Generic => "generic",
        }
    }
}

/// One suggested technology stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechStackOption {
    pub id: u32,
    pub name: String,
    pub language: String,
    pub framework: String,
    pub database: String,
    pub dependencies: Vec<String>,
    pub tools: Vec<String>,
    pub deployment: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub complexity: ComplexityRating,
    pub estimated_time: String,
    pub best_use_case: String,
    #[serde(default)]
    pub family: StackFamily,
}

impl TechStackOption {
    /// Convert one decoded element. `position` is the 1-based slot used
    /// when the element carries no usable `id`. Returns `None` when the
    /// mandatory `name` is missing or blank.
    pub fn from_value(value: &Value, position: u32) -> Option<Self> {
        let name = str_field(value, "name");
        if name.trim().is_empty() {
            return None;
        }
        let id = value
            .get("id")
            .and_then(Value::as_u64)
            .map(|id| id as u32)
            .unwrap_or(position);
        let family = StackFamily::classify(&name);

        Some(TechStackOption {
            id,
            family,
            language: str_field(value, "language"),
            framework: str_field(value, "framework"),
            database: str_field(value, "database"),
            dependencies: list_field(value, "dependencies"),
            tools: list_field(value, "tools"),
            deployment: str_field(value, "deployment"),
            pros: list_field(value, "pros"),
            cons: list_field(value, "cons"),
            complexity: ComplexityRating::parse(&str_field(value, "complexity")),
            estimated_time: str_field(value, "estimated_time"),
            best_use_case: str_field(value, "best_use_case"),
            name,
        })
    }

    /// One-line rendering for prompts and tables.
    pub fn summary(&self) -> String {
        format!(
            "{} ({} / {} / {}; deploy: {})",
            self.name, self.language, self.framework, self.database, self.deployment
        )
    }
}

/// Decode a model response into stack options. `None` means the value is
/// not a non-empty array in which every element carries a usable `name`,
/// and the caller should fall back to the built-in catalog.
pub fn decode_stack_options(value: &Value) -> Option<Vec<TechStackOption>> {
    let array = value.as_array()?;
    if array.is_empty() {
        return None;
    }
    let mut options = Vec::with_capacity(array.len());
    for (index, element) in array.iter().enumerate() {
        options.push(TechStackOption::from_value(element, index as u32 + 1)?);
    }
    assign_unique_ids(&mut options);
    Some(options)
}

/// Duplicate or zero ids are replaced with the smallest unused id, in
/// option order, so the set always satisfies the uniqueness invariant.
fn assign_unique_ids(options: &mut [TechStackOption]) {
    let mut seen = std::collections::HashSet::new();
    for option in options.iter_mut() {
        if option.id == 0 || !seen.insert(option.id) {
            let mut candidate = 1;
            while seen.contains(&candidate) {
                candidate += 1;
            }
            option.id = candidate;
            seen.insert(candidate);
        }
    }
}

/// Directory layout of a proposed project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureLayout {
    pub root_files: Vec<String>,
    pub directories: IndexMap<String, Vec<String>>,
}

/// Dependency groups of a proposed project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyGroups {
    pub main: Vec<String>,
    pub dev: Vec<String>,
    pub test: Vec<String>,
}

/// A proposed project structure. `success == false` carries the decode
/// failure in `error`; the rest of the pipeline keeps going either way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStructure {
    pub success: bool,
    pub project_name: String,
    #[serde(rename = "structure")]
    pub layout: StructureLayout,
    pub dependencies: DependencyGroups,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProjectStructure {
    /// Convert a decoded object. The only shape requirement is the
    /// presence of a `success` key; everything else defaults.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() || value.get("success").is_none() {
            return None;
        }

        let layout = value
            .get("structure")
            .map(|structure| StructureLayout {
                root_files: list_field(structure, "root_files"),
                directories: structure
                    .get("directories")
                    .and_then(Value::as_object)
                    .map(|dirs| {
                        dirs.iter()
                            .map(|(path, files)| (path.clone(), value_to_list(files)))
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .unwrap_or_default();

        let dependencies = value
            .get("dependencies")
            .map(|deps| DependencyGroups {
                main: list_field(deps, "main"),
                dev: list_field(deps, "dev"),
                test: list_field(deps, "test"),
            })
            .unwrap_or_default();

        let mut structure = ProjectStructure {
            success: truthy(value.get("success")),
            project_name: str_field(value, "project_name"),
            layout,
            dependencies,
            description: str_field(value, "description"),
            error: None,
        };
        structure.normalize();
        Some(structure)
    }

    /// Decode-failure record; the pipeline continues with it.
    pub fn failed(reason: impl Into<String>) -> Self {
        ProjectStructure {
            success: false,
            error: Some(reason.into()),
            ..ProjectStructure::default()
        }
    }

    /// Directory keys end with `/`; blank file names are dropped.
    pub fn normalize(&mut self) {
        self.layout.root_files.retain(|f| !f.trim().is_empty());
        let directories = std::mem::take(&mut self.layout.directories);
        for (path, mut files) in directories {
            files.retain(|f| !f.trim().is_empty());
            let key = if path.ends_with('/') || path.ends_with('\\') {
                path
            } else {
                format!("{path}/")
            };
            self.layout.directories.insert(key, files);
        }
    }

    /// Total number of files named anywhere in the layout.
    pub fn file_count(&self) -> usize {
        self.layout.root_files.len()
            + self
                .layout
                .directories
                .values()
                .map(|files| files.len())
                .sum::<usize>()
    }
}

/// The three generated file sections, insertion-ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileBundle {
    pub main_files: IndexMap<String, String>,
    pub test_files: IndexMap<String, String>,
    pub additional_files: IndexMap<String, String>,
}

impl FileBundle {
    /// Enforce the cross-section filename invariant: a name appearing in
    /// a later section evicts the earlier entry (explicit last-write-wins,
    /// merge order main -> test -> additional). Returns the evicted names.
    pub fn enforce_unique(&mut self) -> Vec<String> {
        let mut evicted = Vec::new();
        let test_names: Vec<String> = self.test_files.keys().cloned().collect();
        for name in test_names {
            if self.main_files.shift_remove(&name).is_some() {
                evicted.push(format!("main_files/{name}"));
            }
        }
        let additional_names: Vec<String> = self.additional_files.keys().cloned().collect();
        for name in additional_names {
            if self.main_files.shift_remove(&name).is_some() {
                evicted.push(format!("main_files/{name}"));
            }
            if self.test_files.shift_remove(&name).is_some() {
                evicted.push(format!("test_files/{name}"));
            }
        }
        evicted
    }

    /// All files in one map, section order preserved.
    pub fn merged(&self) -> IndexMap<String, String> {
        let mut merged = IndexMap::new();
        for (name, content) in self
            .main_files
            .iter()
            .chain(self.test_files.iter())
            .chain(self.additional_files.iter())
        {
            merged.insert(name.clone(), content.clone());
        }
        merged
    }

    pub fn file_count(&self) -> usize {
        self.main_files.len() + self.test_files.len() + self.additional_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}

/// Result of requirement validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementCheck {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

pub const REQUIREMENT_MIN_LENGTH: usize = 10;
pub const REQUIREMENT_MAX_LENGTH: usize = 1000;
const FORBIDDEN_FRAGMENTS: [&str; 2] = ["<script>", "javascript:"];

/// Validate a requirement before any model call.
pub fn validate_requirement(requirement: &str) -> RequirementCheck {
    validate_requirement_with(requirement, REQUIREMENT_MIN_LENGTH, REQUIREMENT_MAX_LENGTH)
}

/// Same checks with configured length bounds.
pub fn validate_requirement_with(requirement: &str, min: usize, max: usize) -> RequirementCheck {
    let mut check = RequirementCheck {
        valid: true,
        ..RequirementCheck::default()
    };

    let length = requirement.chars().count();
    if length < min {
        check.errors.push(format!(
            "Requirement too short. Minimum {min} characters required."
        ));
        check.valid = false;
    }
    if length > max {
        check
            .warnings
            .push("Requirement very long. Consider breaking it down.".to_string());
    }

    let lowered = requirement.to_lowercase();
    for fragment in FORBIDDEN_FRAGMENTS {
        if lowered.contains(fragment) {
            check
                .errors
                .push(format!("Forbidden pattern detected: {fragment}"));
            check.valid = false;
        }
    }

    if !lowered.contains("function") && !lowered.contains("class") {
        check.suggestions.push(
            "Consider specifying if you need a function or class implementation.".to_string(),
        );
    }

    check
}

/// `"true"`, `true`, and nonzero numbers count as set.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn str_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn list_field(value: &Value, key: &str) -> Vec<String> {
    value.get(key).map(value_to_list).unwrap_or_default()
}

fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}
