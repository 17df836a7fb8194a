//! In-memory `SheetsApi` used by the unit tests.

use crate::gsheets::types::*;
use crate::gsheets::SheetsApi;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct FakeDocument {
    title: String,
    worksheets: Vec<(Worksheet, Vec<Row>)>,
}

#[derive(Default)]
pub struct FakeSheets {
    documents: Mutex<HashMap<String, FakeDocument>>,
    /// `(spreadsheet_id, email, role, notify)` per grant.
    shares: Mutex<Vec<(String, String, ShareRole, bool)>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    fail_appends: Mutex<Option<SheetsApiError>>,
}

impl FakeSheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document with one worksheet per title.
    pub fn with_document(self, spreadsheet_id: &str, worksheets: &[&str]) -> Self {
        let doc = FakeDocument {
            title: spreadsheet_id.to_string(),
            worksheets: worksheets
                .iter()
                .enumerate()
                .map(|(i, title)| (worksheet(i as i64, title, 1000, 26), Vec::new()))
                .collect(),
        };
        self.documents
            .lock()
            .unwrap()
            .insert(spreadsheet_id.to_string(), doc);
        self
    }

    pub fn fail_appends_with(&self, err: SheetsApiError) {
        *self.fail_appends.lock().unwrap() = Some(err);
    }

    /// Number of remote calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shares(&self) -> Vec<(String, String, ShareRole, bool)> {
        self.shares.lock().unwrap().clone()
    }

    pub fn rows(&self, spreadsheet_id: &str, title: &str) -> Vec<Row> {
        let docs = self.documents.lock().unwrap();
        docs.get(spreadsheet_id)
            .and_then(|d| d.worksheets.iter().find(|(ws, _)| ws.title == title))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default()
    }

    pub fn worksheet_count(&self, spreadsheet_id: &str) -> usize {
        let docs = self.documents.lock().unwrap();
        docs.get(spreadsheet_id).map(|d| d.worksheets.len()).unwrap_or(0)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn worksheet(sheet_id: i64, title: &str, rows: u32, cols: u32) -> Worksheet {
    Worksheet {
        sheet_id,
        title: title.to_string(),
        row_count: rows,
        column_count: cols,
    }
}

fn not_found(spreadsheet_id: &str) -> SheetsApiError {
    SheetsApiError::http(404, format!("Requested entity was not found: {}", spreadsheet_id))
}

/// Splits `'Sheet'!A2:F` into the worksheet title and the first row of the range.
fn parse_range(range: &str) -> (String, usize) {
    let (sheet, cells) = match range.split_once('!') {
        Some((sheet, cells)) => (sheet, Some(cells)),
        None => (range, None),
    };
    let title = sheet
        .trim_matches('\'')
        .replace("''", "'");
    let start_row = cells
        .and_then(|c| {
            let digits: String = c
                .split(':')
                .next()
                .unwrap_or("")
                .chars()
                .filter(|ch| ch.is_ascii_digit())
                .collect();
            digits.parse::<usize>().ok()
        })
        .unwrap_or(1);
    (title, start_row.max(1))
}

impl FakeDocument {
    fn as_document(&self, spreadsheet_id: &str) -> Document {
        Document {
            spreadsheet_id: spreadsheet_id.to_string(),
            title: self.title.clone(),
            worksheets: self.worksheets.iter().map(|(ws, _)| ws.clone()).collect(),
        }
    }
}

#[async_trait]
impl SheetsApi for FakeSheets {
    async fn open_by_key(&self, spreadsheet_id: &str) -> Result<Document, SheetsApiError> {
        self.tick();
        let docs = self.documents.lock().unwrap();
        docs.get(spreadsheet_id)
            .map(|d| d.as_document(spreadsheet_id))
            .ok_or_else(|| not_found(spreadsheet_id))
    }

    async fn create_document(&self, title: &str) -> Result<Document, SheetsApiError> {
        self.tick();
        let id = format!("sheet-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let doc = FakeDocument {
            title: title.to_string(),
            worksheets: vec![(worksheet(0, "Sheet1", 1000, 26), Vec::new())],
        };
        let document = doc.as_document(&id);
        self.documents.lock().unwrap().insert(id, doc);
        Ok(document)
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<Worksheet, SheetsApiError> {
        self.tick();
        let mut docs = self.documents.lock().unwrap();
        let doc = docs.get_mut(spreadsheet_id).ok_or_else(|| not_found(spreadsheet_id))?;
        if doc.worksheets.iter().any(|(ws, _)| ws.title == title) {
            return Err(SheetsApiError::http(
                400,
                format!("A sheet with the name \"{}\" already exists.", title),
            ));
        }
        let ws = worksheet(doc.worksheets.len() as i64 + 100, title, rows, cols);
        doc.worksheets.push((ws.clone(), Vec::new()));
        Ok(ws)
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Row],
        input: ValueInputOption,
    ) -> Result<Value, SheetsApiError> {
        self.tick();
        if let Some(err) = self.fail_appends.lock().unwrap().clone() {
            return Err(err);
        }
        let (title, _) = parse_range(range);
        let mut docs = self.documents.lock().unwrap();
        let doc = docs.get_mut(spreadsheet_id).ok_or_else(|| not_found(spreadsheet_id))?;
        let (_, grid) = doc
            .worksheets
            .iter_mut()
            .find(|(ws, _)| ws.title == title)
            .ok_or_else(|| SheetsApiError::http(400, format!("Unable to parse range: {}", range)))?;

        let first = grid.len() + 1;
        grid.extend(rows.iter().cloned());

        Ok(json!({
            "spreadsheetId": spreadsheet_id,
            "tableRange": range,
            "valueInputOption": input.as_str(),
            "updates": {
                "updatedRange": format!("{}!A{}", title, first),
                "updatedRows": rows.len(),
            }
        }))
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Row>, SheetsApiError> {
        self.tick();
        let (title, start_row) = parse_range(range);
        let docs = self.documents.lock().unwrap();
        let doc = docs.get(spreadsheet_id).ok_or_else(|| not_found(spreadsheet_id))?;
        let (_, grid) = doc
            .worksheets
            .iter()
            .find(|(ws, _)| ws.title == title)
            .ok_or_else(|| SheetsApiError::http(400, format!("Unable to parse range: {}", range)))?;
        Ok(grid.iter().skip(start_row - 1).cloned().collect())
    }

    async fn share(
        &self,
        spreadsheet_id: &str,
        email: &str,
        role: ShareRole,
        notify: bool,
    ) -> Result<(), SheetsApiError> {
        self.tick();
        if !self.documents.lock().unwrap().contains_key(spreadsheet_id) {
            return Err(not_found(spreadsheet_id));
        }
        self.shares
            .lock()
            .unwrap()
            .push((spreadsheet_id.to_string(), email.to_string(), role, notify));
        Ok(())
    }
}
