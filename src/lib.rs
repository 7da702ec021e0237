//! # Grading Workflow Integration Library
//!
//! This Rust library connects instructor tooling to externally hosted exam-grading automation
//! workflows. It simplifies tasks like synthesizing a grading rubric from a PDF exam, grading a
//! student submission against a rubric, and pushing a grading summary to a spreadsheet.
//! The library utilizes the `reqwest` crate for HTTP requests and incorporates concurrency control
//! for efficient request handling.
//!
//! All "intelligence" (PDF parsing, rubric synthesis, grading logic) lives inside the external
//! workflows, reachable only through HTTP webhook endpoints whose URLs are supplied via
//! configuration. This library is the transport, response unwrapping, error normalization and
//! per-action state around those three webhooks.
//!
//! ## Core Features
//!
//! - **Endpoint Configuration:** Loads the three webhook URLs from environment variables, with the
//!   system keyring as fallback storage.
//! - **Rubric Lifecycle:** Generate a rubric through the external workflow, import one from a local
//!   JSON file, or select a bundled preset; export the current rubric as `rubrica.json`.
//! - **Grading Dispatch:** Sends a rubric plus a student submission to the grading workflow and
//!   recovers the report even when the workflow wraps it inside an HTML iframe.
//! - **Spreadsheet Upload:** Pushes a per-student grading summary to a spreadsheet workflow.
//!
//! ## Usage
//!
//! To use this library, add it as a dependency in your `Cargo.toml`.
//!
//! ```toml
//! [dependencies]
//! grading_workflow_connector = "0.1"
//! ```
//!
//! The primary entry point is `GradingSession`, which owns the configured endpoints, the current
//! rubric and the state of each workflow action. Each action validates its inputs synchronously,
//! issues at most one request, and settles into a success or a `WebhookError` that is local to
//! that action.
//!
//! ### Examples
//!
//! Generating a rubric and grading a submission:
//! ```no_run
//! use grading_workflow_connector::{GradingSession, WorkflowEndpoints};
//!
//! let mut session = GradingSession::new(WorkflowEndpoints::load());
//! let pdf_bytes = std::fs::read("parcial.pdf").unwrap();
//! match session.generate_rubric("parcial.pdf", pdf_bytes) {
//!     Ok(rubric) => println!("Rubric: {}", rubric),
//!     Err(e) => eprintln!("Generation failed: {} {:?}", e, e.details),
//! }
//! let submission_bytes = std::fs::read("entrega.pdf").unwrap();
//! match session.grade_submission("entrega.pdf", submission_bytes) {
//!     Ok(report) => println!("Report: {}", report),
//!     Err(e) => eprintln!("Grading failed: {}", e),
//! }
//! ```
mod connection; // Manages HTTP requests to the workflow webhooks and error normalization.
pub mod endpoints; // Handles the storage and retrieval of webhook URLs.
pub mod envelope; // Recovers payloads wrapped in an HTML iframe srcdoc attribute.
pub mod json_util; // Safe JSON stringify/parse helpers.
pub mod presets; // Bundled preset rubric catalog.
pub mod rubric; // Rubric document lifecycle: import, export, provenance.
pub mod session; // Per-action state machine for the three workflows.
pub mod workflow; // The three webhook operations.

// Exports key structures for external use.
pub use connection::{WebhookError, WebhookReply};
pub use endpoints::WorkflowEndpoints;
pub use presets::PresetRubric;
pub use rubric::{RubricDocument, RubricProvenance, RUBRIC_FILE_NAME};
pub use session::{ActionState, GradingSession, WorkflowAction};
pub use workflow::SpreadsheetRow;

#[cfg(test)]
mod tests {
    use crate::{GradingSession, WorkflowAction, WorkflowEndpoints};

    #[test]
    fn test_unconfigured_session_fails_validation_without_network() {
        // No URLs configured at all: every action settles into a validation
        // error at invocation time, never at startup.
        let mut session = GradingSession::new(WorkflowEndpoints::with_urls(None, None, None));

        let err = session
            .generate_rubric("parcial.pdf", b"%PDF-1.4".to_vec())
            .unwrap_err();
        assert!(err.message.contains("not configured"));
        assert!(session.state(WorkflowAction::GenerateRubric).error().is_some());
        assert!(!session.is_busy(WorkflowAction::GenerateRubric));
    }
}
