//! Google Sheets / Drive access.
//!
//! `SheetsApi` is the boundary the spreadsheet adapter talks to. The production
//! implementation is [`GoogleSheetsClient`]; tests use an in-memory fake.

pub mod auth;
pub mod client;
#[cfg(test)]
pub mod fake;
pub mod types;

pub use auth::{CredentialSource, ServiceAccountAuth, ServiceAccountKey};
pub use client::GoogleSheetsClient;
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;

/// OAuth scopes requested for the service account. Drive is needed to create and share
/// documents.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Fetches document metadata (title and worksheets).
    async fn open_by_key(&self, spreadsheet_id: &str) -> Result<Document, SheetsApiError>;

    /// Creates a new document and returns its metadata.
    async fn create_document(&self, title: &str) -> Result<Document, SheetsApiError>;

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<Worksheet, SheetsApiError>;

    /// Appends rows after the table found in `range`. Returns the raw acknowledgment.
    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Row],
        input: ValueInputOption,
    ) -> Result<Value, SheetsApiError>;

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Row>, SheetsApiError>;

    /// Grants `role` on the document to `email`, notifying the recipient.
    async fn share(
        &self,
        spreadsheet_id: &str,
        email: &str,
        role: ShareRole,
        notify: bool,
    ) -> Result<(), SheetsApiError>;
}

/// Builds an A1 reference scoped to a worksheet, e.g. `'Expense Log'!A2:F`.
/// Without a cell range the whole worksheet is addressed.
pub fn qualified_range(worksheet: &str, cells: Option<&str>) -> String {
    let quoted = format!("'{}'", worksheet.replace('\'', "''"));
    match cells.map(str::trim).filter(|c| !c.is_empty()) {
        Some(cells) => format!("{}!{}", quoted, cells),
        None => quoted,
    }
}
