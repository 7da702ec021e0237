// Import necessary crates and modules
use keyring::Entry;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::connection::WebhookError;

// Environment variable names for the three workflow webhooks.
pub const RUBRIC_WEBHOOK_URL_VAR: &str = "RUBRIC_WEBHOOK_URL";
pub const GRADING_WEBHOOK_URL_VAR: &str = "GRADING_WEBHOOK_URL";
pub const SPREADSHEET_WEBHOOK_URL_VAR: &str = "SPREADSHEET_WEBHOOK_URL";

/// Structure holding the configured URLs of the three automation workflows.
///
/// Each URL may independently be absent: absence is not an error at load time,
/// only at the moment the corresponding action is invoked. The structure is
/// built once at startup and passed explicitly to the components that dispatch
/// workflow actions, instead of being looked up ambiently at call sites.
///
/// Fields:
/// - `rubric_url`: Endpoint of the rubric-generation workflow.
/// - `grading_url`: Endpoint of the grading workflow.
/// - `spreadsheet_url`: Endpoint of the spreadsheet-upload workflow.
/// - `client`: Shared HTTP client used for every webhook request.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct WorkflowEndpoints {
    pub rubric_url: Option<String>,
    pub grading_url: Option<String>,
    pub spreadsheet_url: Option<String>,
    #[serde(skip)]
    pub client: Client,
}

impl WorkflowEndpoints {
    /// Loads the webhook URLs from environment variables.
    ///
    /// Reads `RUBRIC_WEBHOOK_URL`, `GRADING_WEBHOOK_URL` and
    /// `SPREADSHEET_WEBHOOK_URL`. Missing variables simply leave the
    /// corresponding field unset.
    pub fn load_from_env() -> WorkflowEndpoints {
        WorkflowEndpoints {
            rubric_url: std::env::var(RUBRIC_WEBHOOK_URL_VAR).ok(),
            grading_url: std::env::var(GRADING_WEBHOOK_URL_VAR).ok(),
            spreadsheet_url: std::env::var(SPREADSHEET_WEBHOOK_URL_VAR).ok(),
            client: Client::new(),
        }
    }

    /// Loads the webhook URLs from the system's keyring.
    ///
    /// Retrieves each URL stored under this crate's service name. Entries that
    /// cannot be read leave the corresponding field unset.
    pub fn load_from_system() -> WorkflowEndpoints {
        let app_name = env!("CARGO_PKG_NAME");

        fn read_entry(app_name: &str, key: &str) -> Option<String> {
            match Entry::new(app_name, key) {
                Ok(entry) => entry.get_password().ok(),
                Err(_) => None,
            }
        }

        WorkflowEndpoints {
            rubric_url: read_entry(app_name, RUBRIC_WEBHOOK_URL_VAR),
            grading_url: read_entry(app_name, GRADING_WEBHOOK_URL_VAR),
            spreadsheet_url: read_entry(app_name, SPREADSHEET_WEBHOOK_URL_VAR),
            client: Client::new(),
        }
    }

    /// Loads the webhook URLs, attempting first from environment variables,
    /// then from the system's keyring for any URL the environment did not
    /// provide.
    pub fn load() -> WorkflowEndpoints {
        let from_env = Self::load_from_env();
        if from_env.rubric_url.is_some()
            && from_env.grading_url.is_some()
            && from_env.spreadsheet_url.is_some()
        {
            return from_env;
        }

        let from_system = Self::load_from_system();
        WorkflowEndpoints {
            rubric_url: from_env.rubric_url.or(from_system.rubric_url),
            grading_url: from_env.grading_url.or(from_system.grading_url),
            spreadsheet_url: from_env.spreadsheet_url.or(from_system.spreadsheet_url),
            client: Client::new(),
        }
    }

    /// Stores the configured URLs in the system's keyring.
    ///
    /// Only the URLs that are present are written. Used by setup tooling so a
    /// workstation does not need the environment variables on every run.
    pub fn store_in_system(&self) -> Result<(), WebhookError> {
        let app_name = env!("CARGO_PKG_NAME");

        fn write_entry(app_name: &str, key: &str, value: &Option<String>) -> Result<(), WebhookError> {
            if let Some(url) = value {
                let entry = Entry::new(app_name, key)
                    .map_err(|e| WebhookError::validation(format!("Error accessing keyring: {}", e)))?;
                entry
                    .set_password(url)
                    .map_err(|e| WebhookError::validation(format!("Error saving {}: {}", key, e)))?;
            }
            Ok(())
        }

        write_entry(app_name, RUBRIC_WEBHOOK_URL_VAR, &self.rubric_url)?;
        write_entry(app_name, GRADING_WEBHOOK_URL_VAR, &self.grading_url)?;
        write_entry(app_name, SPREADSHEET_WEBHOOK_URL_VAR, &self.spreadsheet_url)?;
        Ok(())
    }

    /// Returns the rubric-generation webhook URL, or a validation error when
    /// it is not configured.
    pub fn rubric_url(&self) -> Result<&str, WebhookError> {
        self.rubric_url.as_deref().ok_or_else(|| {
            WebhookError::validation("The rubric generation webhook URL is not configured")
        })
    }

    /// Returns the grading webhook URL, or a validation error when it is not
    /// configured.
    pub fn grading_url(&self) -> Result<&str, WebhookError> {
        self.grading_url
            .as_deref()
            .ok_or_else(|| WebhookError::validation("The grading webhook URL is not configured"))
    }

    /// Returns the spreadsheet-upload webhook URL, or a validation error when
    /// it is not configured.
    pub fn spreadsheet_url(&self) -> Result<&str, WebhookError> {
        self.spreadsheet_url.as_deref().ok_or_else(|| {
            WebhookError::validation("The spreadsheet upload webhook URL is not configured")
        })
    }

    /// Convenience constructor for consumers that already hold the three URLs,
    /// e.g. from a configuration file of their own.
    pub fn with_urls(
        rubric_url: Option<String>,
        grading_url: Option<String>,
        spreadsheet_url: Option<String>,
    ) -> WorkflowEndpoints {
        WorkflowEndpoints {
            rubric_url,
            grading_url,
            spreadsheet_url,
            client: Client::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_is_a_validation_error_at_invocation() {
        let endpoints = WorkflowEndpoints::with_urls(None, None, None);

        let err = endpoints.rubric_url().unwrap_err();
        assert!(err.message.contains("rubric"));
        assert!(err.details.is_none());

        assert!(endpoints.grading_url().is_err());
        assert!(endpoints.spreadsheet_url().is_err());
    }

    #[test]
    fn test_configured_urls_are_returned() {
        let endpoints = WorkflowEndpoints::with_urls(
            Some("https://flows.example.com/webhook/rubric".to_string()),
            Some("https://flows.example.com/webhook/grade".to_string()),
            Some("https://flows.example.com/webhook/sheet".to_string()),
        );

        assert_eq!(
            endpoints.rubric_url().unwrap(),
            "https://flows.example.com/webhook/rubric"
        );
        assert_eq!(
            endpoints.grading_url().unwrap(),
            "https://flows.example.com/webhook/grade"
        );
        assert_eq!(
            endpoints.spreadsheet_url().unwrap(),
            "https://flows.example.com/webhook/sheet"
        );
    }
}
