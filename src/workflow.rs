use log::debug;
use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::connection::{send_webhook_request, WebhookError, WebhookReply};
use crate::endpoints::WorkflowEndpoints;
use crate::envelope::unwrap_envelope;
use crate::json_util::format_json;
use crate::rubric::RUBRIC_FILE_NAME;

/// Converts a successful webhook reply into the text stored as an action result.
///
/// JSON replies are pretty-printed; text replies are run through the iframe
/// envelope extractor, since the grading workflow sometimes smuggles its
/// document inside an HTML `srcdoc` attribute.
fn settle_reply(reply: WebhookReply) -> String {
    match reply {
        WebhookReply::Json(value) => format_json(&value),
        WebhookReply::Text(text) => unwrap_envelope(&text),
    }
}

/// Invokes the rubric-generation workflow for an exam PDF.
///
/// Sends a multipart POST with a single field `pdf` carrying the selected exam
/// file, and interprets the response: a JSON rubric document, or a string
/// (possibly HTML-wrapped) containing the rubric.
///
/// Arguments:
/// - `endpoints`: Configured workflow URLs and HTTP client.
/// - `file_name`: Name of the selected exam file.
/// - `pdf_content`: Content of the selected exam file.
///
/// Returns:
/// - `Result<String, WebhookError>`: The rubric text, or a normalized error.
///
/// Example:
/// ```no_run
/// use grading_workflow_connector::workflow::generate_rubric;
/// use grading_workflow_connector::WorkflowEndpoints;
///
/// let endpoints = WorkflowEndpoints::load();
/// let pdf_bytes = std::fs::read("parcial.pdf").unwrap();
/// match generate_rubric(&endpoints, "parcial.pdf", pdf_bytes) {
///     Ok(rubric) => println!("Rubric: {}", rubric),
///     Err(e) => eprintln!("Rubric generation failed: {}", e),
/// }
/// ```
pub fn generate_rubric(
    endpoints: &WorkflowEndpoints,
    file_name: &str,
    pdf_content: Vec<u8>,
) -> Result<String, WebhookError> {
    let url = endpoints.rubric_url()?;

    // Monta o formulário multipart com o arquivo da prova
    let pdf_part = Part::bytes(pdf_content)
        .file_name(file_name.to_string())
        .mime_str("application/pdf")
        .map_err(|e| WebhookError::network(format!("Failed to build multipart body: {}", e)))?;
    let form = Form::new().part("pdf", pdf_part);

    let reply = send_webhook_request(&endpoints.client, url, form)?;
    Ok(settle_reply(reply))
}

/// Invokes the grading workflow for a student submission.
///
/// Sends a multipart POST with two fields: `rubric`, the current rubric text
/// attached as `rubrica.json` with MIME `application/json`, and `submission`,
/// the selected student file sent verbatim.
///
/// Arguments:
/// - `endpoints`: Configured workflow URLs and HTTP client.
/// - `rubric_text`: The rubric document to grade against.
/// - `file_name`: Name of the selected submission file.
/// - `submission_content`: Content of the selected submission file.
///
/// Returns:
/// - `Result<String, WebhookError>`: The grading report text, or a normalized error.
pub fn grade_submission(
    endpoints: &WorkflowEndpoints,
    rubric_text: &str,
    file_name: &str,
    submission_content: Vec<u8>,
) -> Result<String, WebhookError> {
    let url = endpoints.grading_url()?;

    let rubric_part = Part::bytes(rubric_text.as_bytes().to_vec())
        .file_name(RUBRIC_FILE_NAME)
        .mime_str("application/json")
        .map_err(|e| WebhookError::network(format!("Failed to build multipart body: {}", e)))?;
    let submission_part = Part::bytes(submission_content).file_name(file_name.to_string());

    let form = Form::new()
        .part("rubric", rubric_part)
        .part("submission", submission_part);

    let reply = send_webhook_request(&endpoints.client, url, form)?;
    Ok(settle_reply(reply))
}

/// One row of the grading summary pushed to the spreadsheet workflow.
///
/// Field names match the text fields expected by the workflow and must not be
/// renamed.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct SpreadsheetRow {
    pub spreadsheet_url: String,
    pub sheet_name: String,
    pub alumno: String,
    pub nota: String,
    pub resumen_por_criterios: String,
    pub fortalezas: String,
    pub recomendaciones: String,
}

impl SpreadsheetRow {
    /// Checks the required fields before any network call. The three summary
    /// columns may be empty; destination and identification may not.
    pub(crate) fn validate(&self) -> Result<(), WebhookError> {
        if self.spreadsheet_url.trim().is_empty() {
            return Err(WebhookError::validation("The spreadsheet URL is required"));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(WebhookError::validation("The sheet name is required"));
        }
        if self.alumno.trim().is_empty() {
            return Err(WebhookError::validation("The student name is required"));
        }
        if self.nota.trim().is_empty() {
            return Err(WebhookError::validation("The grade is required"));
        }
        Ok(())
    }

    fn to_form(&self) -> Form {
        Form::new()
            .text("spreadsheet_url", self.spreadsheet_url.clone())
            .text("sheet_name", self.sheet_name.clone())
            .text("alumno", self.alumno.clone())
            .text("nota", self.nota.clone())
            .text("resumen_por_criterios", self.resumen_por_criterios.clone())
            .text("fortalezas", self.fortalezas.clone())
            .text("recomendaciones", self.recomendaciones.clone())
    }
}

/// Invokes the spreadsheet-upload workflow with a grading summary.
///
/// Sends a multipart POST whose fields are the text columns of the summary
/// row. The expected success response is an arbitrary JSON or string
/// acknowledgement.
///
/// Arguments:
/// - `endpoints`: Configured workflow URLs and HTTP client.
/// - `row`: The summary row to append.
///
/// Returns:
/// - `Result<String, WebhookError>`: The acknowledgement text, or a normalized error.
pub fn upload_to_spreadsheet(
    endpoints: &WorkflowEndpoints,
    row: &SpreadsheetRow,
) -> Result<String, WebhookError> {
    let url = endpoints.spreadsheet_url()?;

    debug!("Uploading summary for {}", row.alumno);
    let reply = send_webhook_request(&endpoints.client, url, row.to_form())?;
    Ok(settle_reply(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::WorkflowEndpoints;

    fn sample_row() -> SpreadsheetRow {
        SpreadsheetRow {
            spreadsheet_url: "https://docs.google.com/spreadsheets/d/abc".to_string(),
            sheet_name: "Parcial 1".to_string(),
            alumno: "Ana García".to_string(),
            nota: "8.5".to_string(),
            resumen_por_criterios: "Correctitud 4/4, Diseño 2.5/3".to_string(),
            fortalezas: "Muy buen manejo de errores".to_string(),
            recomendaciones: "Revisar normalización".to_string(),
        }
    }

    #[test]
    fn test_row_validation_requires_destination_and_identity() {
        assert!(sample_row().validate().is_ok());

        let mut row = sample_row();
        row.spreadsheet_url.clear();
        assert!(row.validate().unwrap_err().message.contains("spreadsheet URL"));

        let mut row = sample_row();
        row.alumno = "   ".to_string();
        assert!(row.validate().unwrap_err().message.contains("student"));
    }

    #[test]
    fn test_row_summary_columns_may_be_empty() {
        let mut row = sample_row();
        row.resumen_por_criterios.clear();
        row.fortalezas.clear();
        row.recomendaciones.clear();
        assert!(row.validate().is_ok());
    }

    #[test]
    fn test_generate_rubric_fails_fast_without_url() {
        let endpoints = WorkflowEndpoints::with_urls(None, None, None);
        let err = generate_rubric(&endpoints, "parcial.pdf", vec![1, 2, 3]).unwrap_err();
        assert!(err.message.contains("not configured"));
    }
}
