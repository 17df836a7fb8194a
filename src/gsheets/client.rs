use crate::gsheets::auth::{CredentialSource, ServiceAccountAuth, ServiceAccountKey};
use crate::gsheets::types::*;
use crate::gsheets::{SheetsApi, SCOPES};
use crate::utils::AppError;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3/files";
const DOCUMENT_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties";

/// Sheets v4 + Drive v3 client authenticated as a service account.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    sheets_base: String,
    drive_base: String,
}

impl GoogleSheetsClient {
    /// Builds the client. Fails fast when the credentials are missing or unusable.
    pub fn from_credentials(source: &CredentialSource, timeout: Duration) -> Result<Self, AppError> {
        let key = ServiceAccountKey::load(source)?;
        Self::with_endpoints(key, timeout, SHEETS_API_BASE, DRIVE_API_BASE)
    }

    /// Same as [`from_credentials`](Self::from_credentials) but against explicit
    /// Sheets and Drive base URLs. The token endpoint comes from the key's `token_uri`.
    pub fn with_endpoints(
        key: ServiceAccountKey,
        timeout: Duration,
        sheets_base: &str,
        drive_base: &str,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        let auth = ServiceAccountAuth::new(key, SCOPES, http.clone())?;

        log::info!("🔐 Google Sheets client ready for {}", auth.client_email());

        Ok(Self {
            http,
            auth,
            sheets_base: sheets_base.trim_end_matches('/').to_string(),
            drive_base: drive_base.trim_end_matches('/').to_string(),
        })
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.sheets_base,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    /// Attaches the bearer token, sends, and decodes the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SheetsApiError> {
        let token = self.auth.access_token().await?;

        let response = request
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SheetsApiError::transport(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(SheetsApiError::http(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SheetsApiError::transport(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn open_by_key(&self, spreadsheet_id: &str) -> Result<Document, SheetsApiError> {
        log::debug!("📄 Opening spreadsheet {}", spreadsheet_id);

        let url = format!("{}/{}", self.sheets_base, urlencoding::encode(spreadsheet_id));
        let resource: SpreadsheetResource = self
            .execute(self.http.get(&url).query(&[("fields", DOCUMENT_FIELDS)]))
            .await?;

        Ok(Document::from(resource))
    }

    async fn create_document(&self, title: &str) -> Result<Document, SheetsApiError> {
        log::debug!("🆕 Creating spreadsheet '{}'", title);

        let body = json!({ "properties": { "title": title } });
        let resource: SpreadsheetResource = self
            .execute(self.http.post(&self.sheets_base).json(&body))
            .await?;

        Ok(Document::from(resource))
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<Worksheet, SheetsApiError> {
        log::debug!("➕ Adding worksheet '{}' ({}x{}) to {}", title, rows, cols, spreadsheet_id);

        let url = format!(
            "{}/{}:batchUpdate",
            self.sheets_base,
            urlencoding::encode(spreadsheet_id)
        );
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": cols }
                    }
                }
            }]
        });

        let reply: BatchUpdateResource = self.execute(self.http.post(&url).json(&body)).await?;

        let properties = reply
            .replies
            .into_iter()
            .next()
            .and_then(|r| r.get("addSheet").and_then(|a| a.get("properties")).cloned())
            .ok_or_else(|| SheetsApiError::transport("addSheet reply carried no properties"))?;

        let properties: SheetProperties = serde_json::from_value(properties)
            .map_err(|e| SheetsApiError::transport(format!("failed to parse addSheet reply: {}", e)))?;

        Ok(Worksheet::from(properties))
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Row],
        input: ValueInputOption,
    ) -> Result<Value, SheetsApiError> {
        log::debug!("📝 Appending {} row(s) to {} ({})", rows.len(), spreadsheet_id, range);

        let url = format!("{}:append", self.values_url(spreadsheet_id, range));
        let body = json!({ "majorDimension": "ROWS", "values": rows });

        self.execute(
            self.http
                .post(&url)
                .query(&[
                    ("valueInputOption", input.as_str()),
                    ("insertDataOption", "INSERT_ROWS"),
                ])
                .json(&body),
        )
        .await
    }

    async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Row>, SheetsApiError> {
        log::debug!("📖 Reading {} from {}", range, spreadsheet_id);

        let url = self.values_url(spreadsheet_id, range);
        let resource: ValueRangeResource = self
            .execute(self.http.get(&url).query(&[
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
            ]))
            .await?;

        Ok(resource.values)
    }

    async fn share(
        &self,
        spreadsheet_id: &str,
        email: &str,
        role: ShareRole,
        notify: bool,
    ) -> Result<(), SheetsApiError> {
        log::debug!("🤝 Sharing {} with {} as {}", spreadsheet_id, email, role.as_str());

        let url = format!(
            "{}/{}/permissions",
            self.drive_base,
            urlencoding::encode(spreadsheet_id)
        );
        let body = json!({
            "type": "user",
            "role": role.as_str(),
            "emailAddress": email,
        });
        let notify = if notify { "true" } else { "false" };

        let _: Value = self
            .execute(
                self.http
                    .post(&url)
                    .query(&[("sendNotificationEmail", notify), ("supportsAllDrives", "true")])
                    .json(&body),
            )
            .await?;

        Ok(())
    }
}
