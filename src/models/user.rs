use crate::utils::AppError;
use serde::Serialize;
use uuid::Uuid;

/// A registered end user. The id is assigned at construction and never changes.
#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct User {
    user_id: String,
    pub user_name: String,
    pub user_email: Option<String>,
    spreadsheet_id: Option<String>,
}

impl User {
    pub fn new(user_name: impl Into<String>, user_email: Option<String>) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            user_name: user_name.into(),
            user_email,
            spreadsheet_id: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id.as_deref()
    }

    /// Links the user's spreadsheet. Can only happen once.
    pub fn link_spreadsheet(&mut self, spreadsheet_id: &str) -> Result<(), AppError> {
        if spreadsheet_id.trim().is_empty() {
            return Err(AppError::Validation("Spreadsheet ID is invalid.".to_string()));
        }
        if let Some(existing) = &self.spreadsheet_id {
            return Err(AppError::State(format!(
                "user {} is already linked to spreadsheet {}",
                self.user_id, existing
            )));
        }
        self.spreadsheet_id = Some(spreadsheet_id.to_string());
        Ok(())
    }
}
