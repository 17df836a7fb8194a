// ==================== SPREADSHEET ADAPTER ====================
// Stateful handle over one remote document + one worksheet. Document and worksheet
// are resolved again on every operation so rebinding the id/name takes effect at once.

use crate::gsheets::{
    qualified_range, CredentialSource, Document, GoogleSheetsClient, Row, SheetsApi,
    ShareRole, ValueInputOption, Worksheet,
};
use crate::utils::AppError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_WORKSHEET_ROWS: u32 = 100;
pub const DEFAULT_WORKSHEET_COLS: u32 = 20;
pub const DEFAULT_WORKSHEET_TITLE: &str = "Expense Log";

/// Header written to the worksheet provisioned by `create_spreadsheet`.
pub const LEDGER_HEADER: [&str; 7] = [
    "Date",
    "Expense",
    "Income",
    "Amount",
    "Currency",
    "Account",
    "Recorded On",
];

/// Result of a read: raw rows, or header-keyed records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Records {
    Rows(Vec<Row>),
    Keyed(Vec<Map<String, Value>>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Rows(rows) => rows.len(),
            Records::Keyed(records) => records.len(),
        }
    }
}

pub struct Spreadsheet {
    client: Arc<dyn SheetsApi>,
    spreadsheet_id: Option<String>,
    worksheet_name: Option<String>,
    range: Option<String>,
}

impl Spreadsheet {
    /// Wraps an already authenticated client.
    pub fn new(client: Arc<dyn SheetsApi>, spreadsheet_id: Option<String>) -> Self {
        Self {
            client,
            spreadsheet_id: spreadsheet_id.filter(|id| !id.trim().is_empty()),
            worksheet_name: None,
            range: None,
        }
    }

    /// Builds the authenticated client from service-account credentials.
    /// Missing or unparsable credentials fail here, before any remote call.
    pub fn from_credentials(
        source: &CredentialSource,
        timeout: Duration,
        spreadsheet_id: Option<String>,
    ) -> Result<Self, AppError> {
        let client = GoogleSheetsClient::from_credentials(source, timeout)?;
        Ok(Self::new(Arc::new(client), spreadsheet_id))
    }

    /// A fresh handle sharing this one's client, with nothing bound.
    pub fn detached(&self) -> Self {
        Self::new(Arc::clone(&self.client), None)
    }

    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id.as_deref()
    }

    /// Points the handle at another existing document.
    pub fn bind_document(&mut self, spreadsheet_id: &str) -> Result<(), AppError> {
        if spreadsheet_id.trim().is_empty() {
            return Err(AppError::Validation("spreadsheet id cannot be empty".to_string()));
        }
        self.spreadsheet_id = Some(spreadsheet_id.to_string());
        Ok(())
    }

    pub fn worksheet_name(&self) -> Option<&str> {
        self.worksheet_name.as_deref()
    }

    pub fn set_worksheet_name(&mut self, name: impl Into<String>) {
        self.worksheet_name = Some(name.into());
    }

    pub fn range(&self) -> Option<&str> {
        self.range.as_deref()
    }

    pub fn set_range(&mut self, range: Option<String>) {
        self.range = range.filter(|r| !r.trim().is_empty());
    }

    fn active_id(&self) -> Result<&str, AppError> {
        self.spreadsheet_id
            .as_deref()
            .ok_or_else(|| AppError::State("document undefined".to_string()))
    }

    fn active_worksheet(&self) -> Result<&str, AppError> {
        self.worksheet_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Sheet name must be given.".to_string()))
    }

    /// Resolves the active identifier to the remote document.
    pub(crate) async fn open_document(&self) -> Result<Document, AppError> {
        let id = self.active_id()?;
        self.client.open_by_key(id).await.map_err(|e| {
            log::error!("❌ Sheet with id {} was not found: {}", id, e);
            AppError::document_not_found(id, e)
        })
    }

    /// Finds `name` in `doc`, creating a 100x20 worksheet when it is missing.
    pub(crate) async fn resolve_worksheet(&self, doc: &Document, name: &str) -> Result<Worksheet, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("worksheet title cannot be empty".to_string()));
        }

        if let Some(ws) = doc.worksheet(name) {
            return Ok(ws.clone());
        }

        log::info!(
            "➕ Worksheet '{}' not found in {}, creating it ({}x{})",
            name,
            doc.spreadsheet_id,
            DEFAULT_WORKSHEET_ROWS,
            DEFAULT_WORKSHEET_COLS
        );

        self.client
            .add_worksheet(&doc.spreadsheet_id, name, DEFAULT_WORKSHEET_ROWS, DEFAULT_WORKSHEET_COLS)
            .await
            .map_err(|e| {
                log::error!("❌ Failed to create worksheet '{}': {}", name, e);
                AppError::document_not_found(&doc.spreadsheet_id, e)
            })
    }

    /// Creates a new document titled `title`, binds it, and provisions the
    /// "Expense Log" worksheet with its header row.
    pub async fn create_spreadsheet(&mut self, title: &str) -> Result<String, AppError> {
        if let Some(existing) = self.spreadsheet_id.as_deref() {
            return Err(AppError::State(format!(
                "spreadsheet already defined ({}); a handle creates at most one document",
                existing
            )));
        }
        if title.trim().is_empty() {
            return Err(AppError::Validation("spreadsheet title cannot be empty".to_string()));
        }

        log::info!("🆕 Creating spreadsheet '{}'", title);

        let doc = self.client.create_document(title).await.map_err(|e| {
            log::error!("❌ Failed to create spreadsheet '{}': {}", title, e);
            AppError::Upstream {
                status: e.status,
                message: e.message,
            }
        })?;

        let id = doc.spreadsheet_id.clone();
        self.spreadsheet_id = Some(id.clone());
        self.worksheet_name = Some(DEFAULT_WORKSHEET_TITLE.to_string());

        let doc = self.open_document().await?;
        let ws = self.resolve_worksheet(&doc, DEFAULT_WORKSHEET_TITLE).await?;

        let header: Row = LEDGER_HEADER.iter().map(|h| Value::from(*h)).collect();
        self.client
            .append_rows(&id, &qualified_range(&ws.title, Some("A1")), &[header], ValueInputOption::Raw)
            .await
            .map_err(|e| upstream(&id, e))?;

        log::info!("✅ Spreadsheet {} created with worksheet '{}'", id, ws.title);

        Ok(id)
    }

    /// Grants `role` (writer by default) on the active document to `email`.
    pub async fn share_spreadsheet(&self, email: &str, role: Option<ShareRole>) -> Result<(), AppError> {
        let id = self.active_id()?;
        if email.trim().is_empty() {
            return Err(AppError::Validation("email cannot be empty".to_string()));
        }
        let role = role.unwrap_or_default();

        self.client
            .share(id, email, role, true)
            .await
            .map_err(|e| upstream(id, e))?;

        log::info!("🤝 Spreadsheet {} shared with {} ({})", id, email, role.as_str());
        Ok(())
    }

    /// Appends `rows` to the active worksheet, inside the active range when set.
    /// Values are interpreted as user-entered. Not idempotent.
    pub async fn append_records(&self, rows: &[Row]) -> Result<Value, AppError> {
        let name = self.active_worksheet()?;
        let doc = self.open_document().await?;
        let ws = self.resolve_worksheet(&doc, name).await?;

        let range = qualified_range(&ws.title, self.range.as_deref());
        self.client
            .append_rows(&doc.spreadsheet_id, &range, rows, ValueInputOption::UserEntered)
            .await
            .map_err(|e| upstream(&doc.spreadsheet_id, e))
    }

    /// Reads the given (or active) worksheet/range.
    ///
    /// With a range the raw rows are returned. Without one, `as_dict` turns the
    /// first row into field names and yields one record per following row.
    pub async fn get_records(
        &self,
        sheet_name: Option<&str>,
        range: Option<&str>,
        as_dict: bool,
    ) -> Result<Records, AppError> {
        let doc = self.open_document().await?;

        let name = sheet_name
            .or(self.worksheet_name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "no worksheet name given; available worksheets: {}",
                    doc.worksheet_titles().join(", ")
                ))
            })?;
        let ws = self.resolve_worksheet(&doc, name).await?;

        let range = range
            .or(self.range.as_deref())
            .filter(|r| !r.trim().is_empty());

        let values = self
            .client
            .get_values(&doc.spreadsheet_id, &qualified_range(&ws.title, range))
            .await
            .map_err(|e| upstream(&doc.spreadsheet_id, e))?;

        if range.is_some() || !as_dict {
            return Ok(Records::Rows(values));
        }

        Ok(Records::Keyed(rows_to_records(values)))
    }
}

fn upstream(spreadsheet_id: &str, e: crate::gsheets::SheetsApiError) -> AppError {
    log::error!("❌ Remote call on {} failed: {}", spreadsheet_id, e);
    AppError::Upstream {
        status: e.status,
        message: e.message,
    }
}

fn cell_key(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// First row is the header; short rows are padded with empty strings.
fn rows_to_records(values: Vec<Row>) -> Vec<Map<String, Value>> {
    let mut rows = values.into_iter();
    let header: Vec<String> = match rows.next() {
        Some(h) => h.iter().map(cell_key).collect(),
        None => return Vec::new(),
    };

    rows.map(|row| {
        let mut cells = row.into_iter();
        header
            .iter()
            .map(|key| (key.clone(), cells.next().unwrap_or_else(|| Value::from(""))))
            .collect()
    })
    .collect()
}
