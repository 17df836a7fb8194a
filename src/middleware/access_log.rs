use crate::api::metrics;
use actix_web::{
    dev::{ServiceRequest, ServiceResponse},
    middleware::Logger,
    Error,
};

pub const ACCESS_LOG_TARGET: &str = "app.access";

/// `remote [dd/Mon/YYYY:HH:MM:SS.mmm] METHOD path scheme status bytes referrer agent N.NNNms`
pub const ACCESS_LOG_FORMAT: &str =
    "%{r}a [%{timestamp}xi] %{method}xi %U %{scheme}xi %s %b %{Referer}i %{User-Agent}i %Dms";

/// One access line per request on the `app.access` target.
pub fn access_logger() -> Logger {
    Logger::new(ACCESS_LOG_FORMAT)
        .log_target(ACCESS_LOG_TARGET)
        .custom_request_replace("timestamp", request_timestamp)
        .custom_request_replace("method", request_method)
        .custom_request_replace("scheme", request_scheme)
}

fn request_timestamp(_req: &ServiceRequest) -> String {
    chrono::Utc::now().format("%d/%b/%Y:%H:%M:%S%.3f").to_string()
}

fn request_method(req: &ServiceRequest) -> String {
    req.method().to_string()
}

fn request_scheme(req: &ServiceRequest) -> String {
    req.connection_info().scheme().to_string()
}

/// Feeds the `/metrics` counters: every request, and 4xx/5xx as errors.
pub fn record_outcome<B>(result: &Result<ServiceResponse<B>, Error>) {
    let status = match result {
        Ok(res) => res.status(),
        Err(err) => err.as_response_error().status_code(),
    };

    metrics::increment_request_count();
    if status.is_client_error() || status.is_server_error() {
        metrics::increment_error_count();
    }
}
