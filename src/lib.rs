// DevForge Library
//
// AI-powered development assistant: turns a natural-language requirement
// into tech stack options, a project structure, generated files with
// tests, and a deployment readiness score. Model replies are treated as
// untrusted input; every pipeline stage has a deterministic fallback.

pub mod ai;
pub mod analysis;
pub mod artifacts;
pub mod config;
pub mod deploy;
pub mod error;
pub mod extract;
pub mod generation;
pub mod ingest;

// Compiled into the library (not cfg(test)) so integration tests and
// downstream consumers can drive the pipeline without a live backend.
pub mod testing;

// Re-export commonly used types
pub use ai::{AiError, AiManager, Provider, TextGenerator};
pub use analysis::{CodeAnalysis, StaticCodeAnalyzer};
pub use artifacts::{ArtifactStore, PersistenceError};
pub use config::{Config, ConfigError, ConfigManager};
pub use deploy::{DeploymentAssessment, DeploymentReadinessScorer};
pub use error::{DevForgeError, DevForgeResult, ErrorKind, ErrorLog, ErrorRecord};
pub use generation::{
    FileBundle, GenerationOrchestrator, PipelineStage, ProjectStructure, StageOutcome,
    TechStackOption,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
