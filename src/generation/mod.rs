//! The generation pipeline.
//!
//! [`GenerationOrchestrator`] drives requirement -> stack options ->
//! project structure -> file bundle, one model request per stage (three
//! for the bundle, issued in parallel). Every stage returns a usable
//! value: model and decode failures are recorded in the [`ErrorLog`] and
//! replaced by that stage's fallback, so callers only ever branch on
//! [`StageOutcome::used_fallback`], never on an error.

pub mod fallback;
pub mod models;
pub mod prompts;

pub use models::{
    decode_stack_options, validate_requirement, validate_requirement_with, ComplexityRating,
    FileBundle, ProjectStructure, RequirementCheck, StackFamily, TechStackOption,
};
pub use prompts::combine_requirement;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::ai::TextGenerator;
use crate::analysis::{StaticCodeAnalyzer, TestScaffoldGenerator};
use crate::error::{ErrorKind, ErrorLog};
use crate::extract::{extract_json, JsonShape};

/// How far the pipeline has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PipelineStage {
    #[default]
    Idle,
    TechStacksSuggested,
    StructureGenerated,
    CodeGenerated,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::TechStacksSuggested => "tech_stacks_suggested",
            PipelineStage::StructureGenerated => "structure_generated",
            PipelineStage::CodeGenerated => "code_generated",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage result plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome<T> {
    pub value: T,
    pub used_fallback: bool,
    pub fallback_reason: Option<String>,
}

impl<T> StageOutcome<T> {
    pub fn direct(value: T) -> Self {
        Self {
            value,
            used_fallback: false,
            fallback_reason: None,
        }
    }

    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            used_fallback: true,
            fallback_reason: Some(reason.into()),
        }
    }
}

/// Why a stage had to fall back. Collapses transport, extraction and
/// validation failures into one recordable shape.
#[derive(Debug)]
struct StageFailure {
    kind: ErrorKind,
    message: String,
}

impl StageFailure {
    fn transport(err: &crate::ai::AiError) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: err.to_string(),
        }
    }

    fn extraction(err: &crate::extract::ExtractionError) -> Self {
        Self {
            kind: ErrorKind::Extraction,
            message: err.to_string(),
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StageFailure {}

/// Decode one bundle section: a `success` marker plus an object under
/// `wrapper_key` holding filename -> content strings. A missing marker and
/// a missing or empty map are both failures so the caller can wrap the raw
/// reply instead.
fn decode_section(raw: &str, wrapper_key: &str) -> Result<IndexMap<String, String>, StageFailure> {
    let value =
        extract_json(raw, JsonShape::Object).map_err(|err| StageFailure::extraction(&err))?;

    if value.get("success").is_none() {
        return Err(StageFailure::validation(format!(
            "reply for '{wrapper_key}' is missing the success key"
        )));
    }

    let files: IndexMap<String, String> = value
        .get(wrapper_key)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(name, content)| {
                    content.as_str().map(|text| (name.clone(), text.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    if files.is_empty() {
        return Err(StageFailure::validation(format!(
            "reply has no files under '{wrapper_key}'"
        )));
    }
    Ok(files)
}

/// Remove a leading ```lang fence line and a trailing ``` from a code reply.
fn strip_test_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_close = trimmed.strip_suffix("```").unwrap_or(trimmed).trim_end();
    let without_open = match without_close.strip_prefix("```") {
        Some(rest) => rest.split_once('\n').map(|(_, body)| body).unwrap_or(""),
        None => without_close,
    };
    without_open.trim().to_string()
}

/// Drives the generation stages against a [`TextGenerator`].
///
/// Holds the pipeline position and a shared error log; one orchestrator
/// corresponds to one project generation run.
pub struct GenerationOrchestrator {
    generator: Arc<dyn TextGenerator>,
    error_log: ErrorLog,
    model: String,
    stage: PipelineStage,
}

impl GenerationOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            error_log: ErrorLog::new(),
            model: model.into(),
            stage: PipelineStage::Idle,
        }
    }

    /// Share an existing log so one report covers the whole run.
    pub fn with_error_log(mut self, error_log: ErrorLog) -> Self {
        self.error_log = error_log;
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Handle to the log this orchestrator records into.
    pub fn error_log(&self) -> ErrorLog {
        self.error_log.clone()
    }

    fn record_fallback(&self, failure: &StageFailure, context: &str, action: &str) {
        tracing::warn!(context, error = %failure, "stage degraded: {}", action);
        self.error_log
            .record_recovered(failure.kind, failure, context, action);
    }

    /// Stage 1: requirement -> stack options.
    ///
    /// Always yields at least one option; any failure swaps in the fixed
    /// catalog.
    pub async fn suggest_tech_stacks(
        &mut self,
        requirement: &str,
    ) -> StageOutcome<Vec<TechStackOption>> {
        let outcome = match self.request_stacks(requirement).await {
            Ok(options) => StageOutcome::direct(options),
            Err(failure) => {
                self.record_fallback(&failure, "suggest_tech_stacks", "used fallback stack catalog");
                StageOutcome::fallback(fallback::fallback_tech_stacks(), failure.message)
            }
        };

        self.stage = PipelineStage::TechStacksSuggested;
        outcome
    }

    async fn request_stacks(&self, requirement: &str) -> Result<Vec<TechStackOption>, StageFailure> {
        let prompt = prompts::tech_stack_prompt(requirement);
        let raw = self
            .generator
            .generate(&prompt, &self.model)
            .await
            .map_err(|err| StageFailure::transport(&err))?;
        let value =
            extract_json(&raw, JsonShape::Array).map_err(|err| StageFailure::extraction(&err))?;
        models::decode_stack_options(&value)
            .ok_or_else(|| StageFailure::validation("no usable stack options in model reply"))
    }

    /// Stage 2: selected stack -> project structure.
    ///
    /// A failure yields [`ProjectStructure::failed`]; the caller decides
    /// whether to substitute a template layout.
    pub async fn generate_structure(
        &mut self,
        requirement: &str,
        stack: &TechStackOption,
    ) -> StageOutcome<ProjectStructure> {
        let outcome = match self.request_structure(requirement, stack).await {
            Ok(structure) => StageOutcome::direct(structure),
            Err(failure) => {
                self.record_fallback(&failure, "generate_structure", "returned error structure");
                StageOutcome::fallback(
                    ProjectStructure::failed(failure.message.clone()),
                    failure.message,
                )
            }
        };

        self.stage = PipelineStage::StructureGenerated;
        outcome
    }

    async fn request_structure(
        &self,
        requirement: &str,
        stack: &TechStackOption,
    ) -> Result<ProjectStructure, StageFailure> {
        let prompt = prompts::project_structure_prompt(requirement, stack);
        let raw = self
            .generator
            .generate(&prompt, &self.model)
            .await
            .map_err(|err| StageFailure::transport(&err))?;
        let value =
            extract_json(&raw, JsonShape::Object).map_err(|err| StageFailure::extraction(&err))?;
        ProjectStructure::from_value(&value)
            .ok_or_else(|| StageFailure::validation("structure reply is missing the success key"))
    }

    /// Stage 3: structure -> three file sections, merged into a bundle.
    ///
    /// The section requests share no state, so they are issued in parallel
    /// and each degrades on its own. A transport failure on the main
    /// section replaces the whole bundle with the family template.
    pub async fn generate_bundle(
        &mut self,
        requirement: &str,
        structure: &ProjectStructure,
        family: StackFamily,
    ) -> StageOutcome<FileBundle> {
        let structure_json =
            serde_json::to_string_pretty(structure).unwrap_or_else(|_| String::from("{}"));

        let (mut bundle, reasons) = self
            .assemble_bundle(requirement, &structure_json, family)
            .await;

        for evicted in bundle.enforce_unique() {
            tracing::warn!(file = %evicted, "duplicate filename across sections, later section wins");
        }

        self.stage = PipelineStage::CodeGenerated;
        if reasons.is_empty() {
            StageOutcome::direct(bundle)
        } else {
            StageOutcome::fallback(bundle, reasons.join("; "))
        }
    }

    async fn assemble_bundle(
        &self,
        requirement: &str,
        structure_json: &str,
        family: StackFamily,
    ) -> (FileBundle, Vec<String>) {
        let main_prompt = prompts::main_files_prompt(requirement, structure_json);
        let test_prompt = prompts::test_files_prompt(requirement, structure_json);
        let additional_prompt = prompts::additional_files_prompt(requirement, structure_json);

        let (main_raw, test_raw, additional_raw) = tokio::join!(
            self.generator.generate(&main_prompt, &self.model),
            self.generator.generate(&test_prompt, &self.model),
            self.generator.generate(&additional_prompt, &self.model),
        );

        let mut reasons = Vec::new();

        let main_files = match main_raw {
            Ok(raw) => match decode_section(&raw, "files") {
                Ok(files) => files,
                Err(failure) => {
                    self.record_fallback(
                        &failure,
                        "generate_bundle(main)",
                        "wrapped raw reply as main.py",
                    );
                    reasons.push(format!("main files: {}", failure.message));
                    fallback::wrap_main_raw(&raw)
                }
            },
            Err(err) => {
                let failure = StageFailure::transport(&err);
                self.record_fallback(&failure, "generate_bundle(main)", "used template bundle");
                reasons.push(format!("main files: {}", failure.message));
                return (fallback::fallback_bundle(family, requirement), reasons);
            }
        };

        let test_files = match test_raw {
            Ok(raw) => match decode_section(&raw, "test_files") {
                Ok(files) => files,
                Err(failure) => {
                    self.record_fallback(
                        &failure,
                        "generate_bundle(test)",
                        "wrapped raw reply as test_main.py",
                    );
                    reasons.push(format!("test files: {}", failure.message));
                    fallback::wrap_test_raw(&raw)
                }
            },
            Err(err) => {
                let failure = StageFailure::transport(&err);
                self.record_fallback(&failure, "generate_bundle(test)", "used template test files");
                reasons.push(format!("test files: {}", failure.message));
                fallback::fallback_bundle(family, requirement).test_files
            }
        };

        let additional_files = match additional_raw {
            Ok(raw) => match decode_section(&raw, "additional_files") {
                Ok(files) => files,
                Err(failure) => {
                    self.record_fallback(
                        &failure,
                        "generate_bundle(additional)",
                        "used standard additional files",
                    );
                    reasons.push(format!("additional files: {}", failure.message));
                    fallback::fallback_additional_files(requirement)
                }
            },
            Err(err) => {
                let failure = StageFailure::transport(&err);
                self.record_fallback(
                    &failure,
                    "generate_bundle(additional)",
                    "used standard additional files",
                );
                reasons.push(format!("additional files: {}", failure.message));
                fallback::fallback_additional_files(requirement)
            }
        };

        (
            FileBundle {
                main_files,
                test_files,
                additional_files,
            },
            reasons,
        )
    }

    /// Generate a test module for one source file, degrading to the static
    /// scaffold when the model cannot help.
    pub async fn generate_tests_for_file(
        &mut self,
        filename: &str,
        code: &str,
        language: &str,
    ) -> StageOutcome<String> {
        let prompt = prompts::test_generation_prompt(filename, code, language);

        match self.generator.generate(&prompt, &self.model).await {
            Ok(raw) => {
                let tests = strip_test_fences(&raw);
                if tests.is_empty() {
                    let failure = StageFailure::validation("model returned an empty test body");
                    self.record_fallback(
                        &failure,
                        "generate_tests_for_file",
                        "generated static scaffold",
                    );
                    StageOutcome::fallback(
                        scaffold_tests(filename, code, language),
                        failure.message,
                    )
                } else {
                    StageOutcome::direct(tests)
                }
            }
            Err(err) => {
                let failure = StageFailure::transport(&err);
                self.record_fallback(
                    &failure,
                    "generate_tests_for_file",
                    "generated static scaffold",
                );
                StageOutcome::fallback(scaffold_tests(filename, code, language), failure.message)
            }
        }
    }
}

/// Deterministic pytest skeleton for a file, used when the model is out.
fn scaffold_tests(filename: &str, code: &str, language: &str) -> String {
    let module = Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("module");
    let analysis = StaticCodeAnalyzer::new().analyze(code, language);
    TestScaffoldGenerator::new().generate(&analysis, module)
}
