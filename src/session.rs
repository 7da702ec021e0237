use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::connection::WebhookError;
use crate::endpoints::WorkflowEndpoints;
use crate::presets;
use crate::rubric::{RubricDocument, RubricProvenance};
use crate::workflow::{self, SpreadsheetRow};

/// The three workflow actions an instructor can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    GenerateRubric,
    GradeSubmission,
    UploadToSpreadsheet,
}

/// State of one workflow action.
///
/// Each action moves idle → in-flight → settled, and back to in-flight only on
/// explicit re-invocation. Starting a new attempt replaces the previous
/// settled state wholesale, so a stale result or error can never outlive the
/// attempt that follows it.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum ActionState {
    Idle,
    InFlight,
    Succeeded {
        result: String,
        settled_at: DateTime<Utc>,
    },
    Failed {
        error: WebhookError,
        settled_at: DateTime<Utc>,
    },
}

impl Default for ActionState {
    fn default() -> Self {
        ActionState::Idle
    }
}

impl ActionState {
    /// True while a request for this action is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, ActionState::InFlight)
    }

    /// The action's result when it settled successfully.
    pub fn result(&self) -> Option<&str> {
        match self {
            ActionState::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    /// The action's error when it settled with a failure.
    pub fn error(&self) -> Option<&WebhookError> {
        match self {
            ActionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// State holder for one instructor grading session.
///
/// Owns the configured endpoints, the current rubric and one `ActionState`
/// per workflow action. Errors are local to the action that produced them and
/// never cross-contaminate another action's state; no error is fatal, the
/// caller can always adjust inputs and retry.
///
/// Example:
/// ```no_run
/// use grading_workflow_connector::{GradingSession, WorkflowEndpoints};
///
/// let mut session = GradingSession::new(WorkflowEndpoints::load());
/// let pdf_bytes = std::fs::read("parcial.pdf").unwrap();
/// match session.generate_rubric("parcial.pdf", pdf_bytes) {
///     Ok(rubric) => println!("Rubric ready: {}", rubric),
///     Err(e) => eprintln!("Generation failed: {}", e),
/// }
/// ```
#[derive(Debug, Default)]
pub struct GradingSession {
    endpoints: WorkflowEndpoints,
    rubric: Option<RubricDocument>,
    generate_state: ActionState,
    grade_state: ActionState,
    upload_state: ActionState,
}

impl GradingSession {
    pub fn new(endpoints: WorkflowEndpoints) -> Self {
        GradingSession {
            endpoints,
            rubric: None,
            generate_state: ActionState::Idle,
            grade_state: ActionState::Idle,
            upload_state: ActionState::Idle,
        }
    }

    /// The rubric currently held by the session, if any.
    pub fn rubric(&self) -> Option<&RubricDocument> {
        self.rubric.as_ref()
    }

    /// Read access to the endpoint configuration.
    pub fn endpoints(&self) -> &WorkflowEndpoints {
        &self.endpoints
    }

    /// Mutable access to the endpoint configuration, for settings screens.
    pub fn endpoints_mut(&mut self) -> &mut WorkflowEndpoints {
        &mut self.endpoints
    }

    /// Current state of a workflow action.
    pub fn state(&self, action: WorkflowAction) -> &ActionState {
        match action {
            WorkflowAction::GenerateRubric => &self.generate_state,
            WorkflowAction::GradeSubmission => &self.grade_state,
            WorkflowAction::UploadToSpreadsheet => &self.upload_state,
        }
    }

    /// Advisory busy flag for a workflow action. The triggering control should
    /// be disabled while this is true to prevent duplicate submissions.
    pub fn is_busy(&self, action: WorkflowAction) -> bool {
        self.state(action).is_busy()
    }

    fn state_mut(&mut self, action: WorkflowAction) -> &mut ActionState {
        match action {
            WorkflowAction::GenerateRubric => &mut self.generate_state,
            WorkflowAction::GradeSubmission => &mut self.grade_state,
            WorkflowAction::UploadToSpreadsheet => &mut self.upload_state,
        }
    }

    /// Moves an action to in-flight, clearing its previous result or error.
    /// Rejects re-entry while a request for the same action is outstanding.
    fn begin(&mut self, action: WorkflowAction) -> Result<(), WebhookError> {
        if self.is_busy(action) {
            return Err(WebhookError::validation(
                "A request for this action is already in progress",
            ));
        }
        // Limpa o resultado anterior antes de iniciar a nova tentativa
        *self.state_mut(action) = ActionState::InFlight;
        Ok(())
    }

    fn settle(
        &mut self,
        action: WorkflowAction,
        outcome: Result<String, WebhookError>,
    ) -> Result<String, WebhookError> {
        match outcome {
            Ok(result) => {
                *self.state_mut(action) = ActionState::Succeeded {
                    result: result.clone(),
                    settled_at: Utc::now(),
                };
                Ok(result)
            }
            Err(error) => {
                *self.state_mut(action) = ActionState::Failed {
                    error: error.clone(),
                    settled_at: Utc::now(),
                };
                Err(error)
            }
        }
    }

    /// Dispatches the rubric-generation workflow for the selected exam file.
    ///
    /// Fails fast with a validation error, without any network call, when no
    /// file is selected or the webhook URL is not configured. On success the
    /// session rubric is replaced by the generated document with provenance
    /// `Generated`.
    pub fn generate_rubric(
        &mut self,
        file_name: &str,
        pdf_content: Vec<u8>,
    ) -> Result<String, WebhookError> {
        self.begin(WorkflowAction::GenerateRubric)?;

        if file_name.trim().is_empty() || pdf_content.is_empty() {
            return self.settle(
                WorkflowAction::GenerateRubric,
                Err(WebhookError::validation("No exam file selected")),
            );
        }

        let outcome = workflow::generate_rubric(&self.endpoints, file_name, pdf_content);
        if let Ok(rubric_text) = &outcome {
            self.rubric = Some(RubricDocument::from_text(
                rubric_text.clone(),
                RubricProvenance::Generated,
            ));
        }
        self.settle(WorkflowAction::GenerateRubric, outcome)
    }

    /// Dispatches the grading workflow for the selected submission file,
    /// grading against the session's current rubric.
    ///
    /// Fails fast with a validation error, without any network call, when no
    /// rubric is present, no file is selected or the webhook URL is not
    /// configured.
    pub fn grade_submission(
        &mut self,
        file_name: &str,
        submission_content: Vec<u8>,
    ) -> Result<String, WebhookError> {
        self.begin(WorkflowAction::GradeSubmission)?;

        let rubric_text = match &self.rubric {
            Some(rubric) => rubric.text.clone(),
            None => {
                return self.settle(
                    WorkflowAction::GradeSubmission,
                    Err(WebhookError::validation(
                        "A rubric is required before grading a submission",
                    )),
                )
            }
        };
        if file_name.trim().is_empty() || submission_content.is_empty() {
            return self.settle(
                WorkflowAction::GradeSubmission,
                Err(WebhookError::validation("No submission file selected")),
            );
        }

        let outcome =
            workflow::grade_submission(&self.endpoints, &rubric_text, file_name, submission_content);
        self.settle(WorkflowAction::GradeSubmission, outcome)
    }

    /// Dispatches the spreadsheet-upload workflow with a grading summary row.
    ///
    /// Fails fast with a validation error, without any network call, when a
    /// required text field is empty or the webhook URL is not configured.
    pub fn upload_summary(&mut self, row: &SpreadsheetRow) -> Result<String, WebhookError> {
        self.begin(WorkflowAction::UploadToSpreadsheet)?;

        if let Err(error) = row.validate() {
            return self.settle(WorkflowAction::UploadToSpreadsheet, Err(error));
        }

        let outcome = workflow::upload_to_spreadsheet(&self.endpoints, row);
        self.settle(WorkflowAction::UploadToSpreadsheet, outcome)
    }

    /// Replaces the session rubric with a document imported from a local JSON
    /// file. The file must parse as JSON; on failure the rubric is left
    /// untouched and no webhook is contacted.
    pub fn import_rubric(&mut self, file_path: &Path) -> Result<(), WebhookError> {
        let rubric = RubricDocument::import_from_file(file_path)?;
        self.rubric = Some(rubric);
        Ok(())
    }

    /// Replaces the session rubric with a bundled preset, looked up by
    /// institution, course and rubric name.
    pub fn select_preset(
        &mut self,
        institution: &str,
        course: &str,
        name: &str,
    ) -> Result<(), WebhookError> {
        let document = presets::find_preset(institution, course, name).ok_or_else(|| {
            WebhookError::validation(format!(
                "No preset rubric '{}' for {} / {}",
                name, institution, course
            ))
        })?;
        let value = crate::json_util::parse_json_safely(document).ok_or_else(|| {
            WebhookError::validation("The bundled rubric is not valid JSON")
        })?;
        self.rubric = Some(RubricDocument::from_value(&value, RubricProvenance::Preset));
        Ok(())
    }

    /// Writes the current rubric to `rubrica.json` in the given directory.
    pub fn export_rubric(&self, output_directory: &Path) -> Result<PathBuf, WebhookError> {
        match &self.rubric {
            Some(rubric) => rubric.export_to_directory(output_directory),
            None => Err(WebhookError::validation("There is no rubric to export")),
        }
    }

    /// Discards the current rubric.
    pub fn clear_rubric(&mut self) {
        self.rubric = None;
    }
}
