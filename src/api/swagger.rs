use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledger Sheets Service API",
        version = "0.1.0",
        description = "Records income and expense transactions as rows in Google Sheets.\n\n**Features:**\n- Append transactions to a worksheet (created on demand)\n- Read rows back, optionally keyed by the header row\n- Per-user spreadsheets created and shared on sign-up\n- Telegram echo webhook\n- Health monitoring and metrics"
    ),
    paths(
        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Edit
        crate::api::edit::append_row,
        crate::api::edit::append_row_in_range,
        crate::api::edit::get_records,
        crate::api::edit::get_records_in_range,

        // Users
        crate::api::users::get_user,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::TransactionPayload,
            crate::models::EditResponse,
            crate::models::User,
        )
    ),
    tags(
        (name = "Health", description = "Health check and system metrics endpoints for monitoring service status."),
        (name = "Edit", description = "Append transactions to and read records from a worksheet."),
        (name = "Users", description = "In-memory user registry. Sign-up itself is the HTML form at /user/new."),
    )
)]
pub struct ApiDoc;
