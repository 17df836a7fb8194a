use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One cell value as sent to / received from the Sheets API.
pub type CellValue = Value;

/// One row of cells, in column order.
pub type Row = Vec<CellValue>;

/// A remote spreadsheet document as seen by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub spreadsheet_id: String,
    pub title: String,
    pub worksheets: Vec<Worksheet>,
}

impl Document {
    pub fn worksheet(&self, title: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.title == title)
    }

    pub fn worksheet_titles(&self) -> Vec<String> {
        self.worksheets.iter().map(|ws| ws.title.clone()).collect()
    }
}

/// A tab within a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: u32,
    pub column_count: u32,
}

/// Permission role granted when sharing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
    Reader,
    Commenter,
    #[default]
    Writer,
    Owner,
}

impl ShareRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareRole::Reader => "reader",
            ShareRole::Commenter => "commenter",
            ShareRole::Writer => "writer",
            ShareRole::Owner => "owner",
        }
    }
}

/// How the remote service interprets appended values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    Raw,
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

/// Failure reported by the Sheets/Drive client. Never leaves the adapter as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetsApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl SheetsApiError {
    pub fn transport(message: impl ToString) -> Self {
        Self {
            status: None,
            message: message.to_string(),
        }
    }

    pub fn http(status: u16, message: impl ToString) -> Self {
        Self {
            status: Some(status),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for SheetsApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(code) => write!(f, "Sheets API error {}: {}", code, self.message),
            None => write!(f, "Sheets API error: {}", self.message),
        }
    }
}

impl std::error::Error for SheetsApiError {}

// ==================== WIRE FORMATS ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpreadsheetResource {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    pub sheets: Vec<SheetResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SpreadsheetProperties {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SheetResource {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SheetProperties {
    #[serde(default)]
    pub sheet_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub grid_properties: Option<GridProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GridProperties {
    #[serde(default)]
    pub row_count: u32,
    #[serde(default)]
    pub column_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValueRangeResource {
    #[serde(default)]
    pub values: Vec<Row>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchUpdateResource {
    #[serde(default)]
    pub replies: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
}

impl From<SheetProperties> for Worksheet {
    fn from(props: SheetProperties) -> Self {
        let (row_count, column_count) = props
            .grid_properties
            .map(|g| (g.row_count, g.column_count))
            .unwrap_or((0, 0));
        Worksheet {
            sheet_id: props.sheet_id,
            title: props.title,
            row_count,
            column_count,
        }
    }
}

impl From<SpreadsheetResource> for Document {
    fn from(resource: SpreadsheetResource) -> Self {
        Document {
            spreadsheet_id: resource.spreadsheet_id,
            title: resource.properties.map(|p| p.title).unwrap_or_default(),
            worksheets: resource
                .sheets
                .into_iter()
                .map(|s| Worksheet::from(s.properties))
                .collect(),
        }
    }
}
