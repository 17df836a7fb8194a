use crate::{
    models::{EditResponse, TransactionPayload},
    services::{spreadsheet_service::Spreadsheet, transaction_service, user_registry::UserRegistry},
    utils::AppError,
};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

/// Table range used when the append URL carries none.
pub const DEFAULT_APPEND_RANGE: &str = "A2:F";

#[derive(Debug, Deserialize)]
pub struct TargetQuery {
    /// Write to / read from this user's linked spreadsheet instead of the default one.
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub user_id: Option<String>,
    #[serde(default)]
    pub as_dict: bool,
}

/// Handle bound to the user's linked spreadsheet, sharing the process client.
async fn user_handle(
    shared: &Spreadsheet,
    users: &RwLock<UserRegistry>,
    user_id: &str,
) -> Result<Spreadsheet, AppError> {
    let users = users.read().await;
    let user = users
        .get(user_id)
        .ok_or_else(|| AppError::NotFound(format!("User ID '{}' does not exist.", user_id)))?;
    let spreadsheet_id = user
        .spreadsheet_id()
        .ok_or_else(|| AppError::State(format!("user {} has no spreadsheet yet", user_id)))?;

    let mut handle = shared.detached();
    handle.bind_document(spreadsheet_id)?;
    Ok(handle)
}

#[utoipa::path(
    post,
    path = "/edit/{sheet_name}/append",
    tag = "Edit",
    params(
        ("sheet_name" = String, Path, description = "Worksheet to append to (created when missing)"),
        ("user_id" = Option<String>, Query, description = "Target the user's linked spreadsheet")
    ),
    request_body = TransactionPayload,
    responses(
        (status = 200, description = "Row appended", body = EditResponse),
        (status = 400, description = "Invalid payload", body = EditResponse),
        (status = 404, description = "Spreadsheet not found", body = EditResponse)
    )
)]
pub async fn append_row(
    sheet: web::Data<Mutex<Spreadsheet>>,
    users: web::Data<RwLock<UserRegistry>>,
    sheet_name: web::Path<String>,
    query: web::Query<TargetQuery>,
    payload: web::Json<TransactionPayload>,
) -> Result<HttpResponse, AppError> {
    append(
        &sheet,
        &users,
        sheet_name.into_inner(),
        DEFAULT_APPEND_RANGE.to_string(),
        query.into_inner(),
        payload.into_inner(),
    )
    .await
}

#[utoipa::path(
    post,
    path = "/edit/{sheet_name}/{sheet_range}/append",
    tag = "Edit",
    params(
        ("sheet_name" = String, Path, description = "Worksheet to append to (created when missing)"),
        ("sheet_range" = String, Path, description = "A1 table range, e.g. A2:F"),
        ("user_id" = Option<String>, Query, description = "Target the user's linked spreadsheet")
    ),
    request_body = TransactionPayload,
    responses(
        (status = 200, description = "Row appended", body = EditResponse),
        (status = 400, description = "Invalid payload", body = EditResponse)
    )
)]
pub async fn append_row_in_range(
    sheet: web::Data<Mutex<Spreadsheet>>,
    users: web::Data<RwLock<UserRegistry>>,
    path: web::Path<(String, String)>,
    query: web::Query<TargetQuery>,
    payload: web::Json<TransactionPayload>,
) -> Result<HttpResponse, AppError> {
    let (sheet_name, sheet_range) = path.into_inner();
    append(&sheet, &users, sheet_name, sheet_range, query.into_inner(), payload.into_inner()).await
}

async fn append(
    sheet: &Mutex<Spreadsheet>,
    users: &RwLock<UserRegistry>,
    sheet_name: String,
    sheet_range: String,
    query: TargetQuery,
    payload: TransactionPayload,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /edit/{}/{}/append", sheet_name, sheet_range);

    if sheet_name.trim().is_empty() {
        log::error!("❌ Sheet name must be given.");
        // reported with 200, not 400
        return Ok(HttpResponse::Ok().json(EditResponse::failure("Sheet name must be given.")));
    }

    let row = transaction_service::build_row(&payload, chrono::Local::now())?;

    // The shared handle stays locked for the whole operation: its fields are per request.
    let mut shared = sheet.lock().await;
    let mut own;
    let handle: &mut Spreadsheet = match query.user_id.as_deref() {
        Some(user_id) => {
            own = user_handle(&shared, users, user_id).await?;
            &mut own
        }
        None => &mut *shared,
    };

    handle.set_range(Some(sheet_range));
    handle.set_worksheet_name(sheet_name.as_str());

    let ack = handle.append_records(&[row]).await?;

    log::info!("✅ Row added to '{}'", sheet_name);
    Ok(HttpResponse::Ok().json(EditResponse::ok("Row added successfully.", ack)))
}

#[utoipa::path(
    get,
    path = "/edit/{sheet_name}/records",
    tag = "Edit",
    params(
        ("sheet_name" = String, Path, description = "Worksheet to read"),
        ("as_dict" = Option<bool>, Query, description = "Key each row by the header row"),
        ("user_id" = Option<String>, Query, description = "Read the user's linked spreadsheet")
    ),
    responses(
        (status = 200, description = "Rows or records", body = EditResponse),
        (status = 404, description = "Spreadsheet not found", body = EditResponse)
    )
)]
pub async fn get_records(
    sheet: web::Data<Mutex<Spreadsheet>>,
    users: web::Data<RwLock<UserRegistry>>,
    sheet_name: web::Path<String>,
    query: web::Query<RecordsQuery>,
) -> Result<HttpResponse, AppError> {
    read(&sheet, &users, sheet_name.into_inner(), None, query.into_inner()).await
}

#[utoipa::path(
    get,
    path = "/edit/{sheet_name}/{sheet_range}/records",
    tag = "Edit",
    params(
        ("sheet_name" = String, Path, description = "Worksheet to read"),
        ("sheet_range" = String, Path, description = "A1 range, e.g. A1:C10; rows come back raw"),
        ("user_id" = Option<String>, Query, description = "Read the user's linked spreadsheet")
    ),
    responses(
        (status = 200, description = "Raw rows", body = EditResponse),
        (status = 404, description = "Spreadsheet not found", body = EditResponse)
    )
)]
pub async fn get_records_in_range(
    sheet: web::Data<Mutex<Spreadsheet>>,
    users: web::Data<RwLock<UserRegistry>>,
    path: web::Path<(String, String)>,
    query: web::Query<RecordsQuery>,
) -> Result<HttpResponse, AppError> {
    let (sheet_name, sheet_range) = path.into_inner();
    read(&sheet, &users, sheet_name, Some(sheet_range), query.into_inner()).await
}

async fn read(
    sheet: &Mutex<Spreadsheet>,
    users: &RwLock<UserRegistry>,
    sheet_name: String,
    sheet_range: Option<String>,
    query: RecordsQuery,
) -> Result<HttpResponse, AppError> {
    log::info!("📖 GET /edit/{}/records (range {:?})", sheet_name, sheet_range);

    let mut shared = sheet.lock().await;
    let mut own;
    let handle: &mut Spreadsheet = match query.user_id.as_deref() {
        Some(user_id) => {
            own = user_handle(&shared, users, user_id).await?;
            &mut own
        }
        None => &mut *shared,
    };

    // Range and worksheet left over from an earlier request must not leak into this one.
    handle.set_range(sheet_range);
    handle.set_worksheet_name(sheet_name.as_str());

    let records = handle.get_records(None, None, query.as_dict).await?;
    let count = records.len();
    let content = serde_json::to_value(records)
        .map_err(|e| AppError::Upstream { status: None, message: e.to_string() })?;

    Ok(HttpResponse::Ok().json(EditResponse::ok(format!("{} record(s) read.", count), content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gsheets::{fake::FakeSheets, SheetsApi};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use std::sync::Arc;

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/edit")
                .route("/{sheet_name}/append", web::post().to(append_row))
                .route("/{sheet_name}/records", web::get().to(get_records))
                .route("/{sheet_name}/{sheet_range}/append", web::post().to(append_row_in_range))
                .route("/{sheet_name}/{sheet_range}/records", web::get().to(get_records_in_range)),
        );
    }

    fn state(fake: &Arc<FakeSheets>) -> (web::Data<Mutex<Spreadsheet>>, web::Data<RwLock<UserRegistry>>) {
        let client: Arc<dyn SheetsApi> = fake.clone();
        (
            web::Data::new(Mutex::new(Spreadsheet::new(client, Some("doc".to_string())))),
            web::Data::new(RwLock::new(UserRegistry::new())),
        )
    }

    #[actix_web::test]
    async fn test_append_expense_row() {
        let fake = Arc::new(FakeSheets::new().with_document("doc", &["Log"]));
        let (sheet, users) = state(&fake);
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/edit/Log/append")
            .set_json(json!({
                "date": "2024-03-02",
                "reason": "Groceries",
                "amount": -42.1,
                "currency": "EUR",
                "account": "Visa",
                "recordedOn": "02.03.2024, 18:30"
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["response_success"], json!(true));
        assert_eq!(body["response_message"], json!("Row added successfully."));
        let rows = fake.rows("doc", "Log");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], json!("Groceries"));
        assert_eq!(rows[0][2], json!("-"));
        assert_eq!(rows[0][6], json!("02.03.2024, 18:30"));
    }

    #[actix_web::test]
    async fn test_append_creates_missing_worksheet() {
        let fake = Arc::new(FakeSheets::new().with_document("doc", &["Log"]));
        let (sheet, users) = state(&fake);
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/edit/April/A2:G/append")
            .set_json(json!({ "date": "2024-04-01", "reason": "Salary", "amount": 3000 }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(fake.worksheet_count("doc"), 2);
        assert_eq!(fake.rows("doc", "April")[0][2], json!("Salary"));
    }

    #[actix_web::test]
    async fn test_append_without_amount_is_rejected() {
        let fake = Arc::new(FakeSheets::new().with_document("doc", &["Log"]));
        let (sheet, users) = state(&fake);
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/edit/Log/append")
            .set_json(json!({ "date": "2024-04-01", "reason": "?" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["response_success"], json!(false));
        assert_eq!(fake.calls(), 0);
    }

    #[actix_web::test]
    async fn test_unknown_document_is_404() {
        let fake = Arc::new(FakeSheets::new());
        let (sheet, users) = state(&fake);
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/edit/Log/append")
            .set_json(json!({ "date": "2024-04-01", "amount": 1 }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_read_back_as_dict() {
        let fake = Arc::new(FakeSheets::new().with_document("doc", &["Log"]));
        let (sheet, users) = state(&fake);
        {
            let mut handle = sheet.lock().await;
            handle.set_worksheet_name("Log");
            handle
                .append_records(&[
                    vec![json!("Date"), json!("Expense"), json!("Income")],
                    vec![json!("2024-01-01"), json!("Rent"), json!("-")],
                ])
                .await
                .unwrap();
        }
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::get().uri("/edit/Log/records?as_dict=true").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["response_success"], json!(true));
        assert_eq!(body["response_content"][0]["Expense"], json!("Rent"));
    }

    #[actix_web::test]
    async fn test_records_after_append_still_keyed_by_header() {
        let fake = Arc::new(FakeSheets::new().with_document("doc", &["Log"]));
        let (sheet, users) = state(&fake);
        {
            let mut handle = sheet.lock().await;
            handle.set_worksheet_name("Log");
            handle
                .append_records(&[vec![
                    json!("Date"),
                    json!("Expense"),
                    json!("Income"),
                    json!("Amount"),
                    json!("Currency"),
                    json!("Account"),
                    json!("Recorded On"),
                ]])
                .await
                .unwrap();
        }
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/edit/Log/append")
            .set_json(json!({ "date": "2024-01-01", "reason": "Rent", "amount": -5 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/edit/Log/records?as_dict=true").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["response_content"][0]["Expense"], json!("Rent"));
        assert_eq!(body["response_content"][0]["Income"], json!("-"));
    }

    #[actix_web::test]
    async fn test_blank_sheet_name_is_reported_with_200() {
        let fake = Arc::new(FakeSheets::new().with_document("doc", &["Log"]));
        let (sheet, users) = state(&fake);
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/edit/%20/append")
            .set_json(json!({ "date": "2024-01-01", "reason": "Rent", "amount": -5 }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["response_success"], json!(false));
        assert_eq!(body["response_message"], json!("Sheet name must be given."));
        assert_eq!(fake.calls(), 0);
    }

    #[actix_web::test]
    async fn test_user_target_without_spreadsheet_is_conflict() {
        let fake = Arc::new(FakeSheets::new().with_document("doc", &["Log"]));
        let (sheet, users) = state(&fake);
        let user_id = users.write().await.add("ana", None).user_id().to_string();
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/edit/Log/append?user_id={}", user_id))
            .set_json(json!({ "date": "2024-04-01", "amount": 1 }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_user_target_writes_to_linked_spreadsheet() {
        let fake = Arc::new(
            FakeSheets::new()
                .with_document("doc", &["Log"])
                .with_document("user-doc", &["Log"]),
        );
        let (sheet, users) = state(&fake);
        let user_id = {
            let mut registry = users.write().await;
            let id = registry.add("ana", None).user_id().to_string();
            registry.set_spreadsheet(&id, "user-doc").unwrap();
            id
        };
        let app = test::init_service(App::new().app_data(sheet).app_data(users).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/edit/Log/append?user_id={}", user_id))
            .set_json(json!({ "date": "2024-04-01", "reason": "Gift", "amount": 20 }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(fake.rows("doc", "Log").is_empty());
        assert_eq!(fake.rows("user-doc", "Log").len(), 1);
    }
}
