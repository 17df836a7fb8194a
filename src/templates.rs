use crate::utils::AppError;
use actix_web::HttpResponse;
use handlebars::Handlebars;
use serde::Serialize;

pub const NEW_USER: &str = "new_user";
pub const SUCCESS: &str = "success";

/// Page templates, compiled once at startup.
pub fn registry() -> Result<Handlebars<'static>, AppError> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(false);

    for (name, source) in [
        (NEW_USER, include_str!("../templates/new_user.hbs")),
        (SUCCESS, include_str!("../templates/success.hbs")),
    ] {
        hb.register_template_string(name, source)
            .map_err(|e| AppError::Configuration(format!("template '{}' is invalid: {}", name, e)))?;
    }

    Ok(hb)
}

/// Renders `name` as an HTML response with `status`.
pub fn render<T: Serialize>(
    hb: &Handlebars<'_>,
    status: actix_web::http::StatusCode,
    name: &str,
    data: &T,
) -> HttpResponse {
    match hb.render(name, data) {
        Ok(html) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => {
            log::error!("❌ Failed to render template '{}': {}", name, e);
            HttpResponse::InternalServerError().body("Template rendering failed")
        }
    }
}
