//! Core analysis engine.
//!
//! The pipeline runs in four phases over an immutable [`program::Program`]:
//!
//! 1. **Collection**: per-file symbol tables and registrations
//! 2. **Resolution**: registrations to implementation declarations
//! 3. **Extraction**: properties and events of each implementation
//! 4. **Assembly**: the [`model::IntermediateModel`]

pub mod annotate;
pub mod assemble;
pub mod collect;
pub mod context;
pub mod diagnostics;
pub mod extract;
pub mod file_scanner;
pub mod model;
pub mod parsers;
pub mod program;
pub mod resolve;
pub mod runtime;
pub mod schema;

pub use context::{AnalysisContext, AnalysisOutcome};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use model::{
    ComponentDefinition, EventDescriptor, FederationConfig, IntermediateModel,
    PropertyDescriptor, RuntimeConfig,
};
pub use schema::SchemaModel;
