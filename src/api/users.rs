use crate::{
    models::User,
    services::{spreadsheet_service::Spreadsheet, user_registry::UserRegistry},
    templates,
    utils::AppError,
};
use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use email_address::EmailAddress;
use handlebars::Handlebars;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Default, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
}

impl NewUserForm {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.user_name.trim().is_empty() {
            errors.push("Username is required.".to_string());
        }
        if !EmailAddress::is_valid(self.email.trim()) {
            errors.push("Invalid email address.".to_string());
        }
        errors
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub name: String,
}

fn form_page(hb: &Handlebars<'_>, status: StatusCode, form: &NewUserForm, errors: &[String]) -> HttpResponse {
    templates::render(
        hb,
        status,
        templates::NEW_USER,
        &json!({
            "user_name": form.user_name,
            "email": form.email,
            "errors": errors,
        }),
    )
}

/// GET /user/new
pub async fn new_user_form(hb: web::Data<Handlebars<'static>>) -> HttpResponse {
    form_page(&hb, StatusCode::OK, &NewUserForm::default(), &[])
}

/// Creates the user's spreadsheet and shares it with them.
async fn provision(handle: &mut Spreadsheet, user: &User, email: &str) -> Result<String, AppError> {
    let spreadsheet_id = handle.create_spreadsheet(user.user_id()).await?;
    handle.share_spreadsheet(email, None).await?;
    Ok(spreadsheet_id)
}

/// POST /user/new
pub async fn create_user(
    hb: web::Data<Handlebars<'static>>,
    sheet: web::Data<Mutex<Spreadsheet>>,
    users: web::Data<RwLock<UserRegistry>>,
    form: web::Form<NewUserForm>,
) -> HttpResponse {
    let form = form.into_inner();
    log::info!("👤 POST /user/new - name: {}", form.user_name);

    let errors = form.validate();
    if !errors.is_empty() {
        log::warn!("⚠️ Invalid user form: {:?}", errors);
        return form_page(&hb, StatusCode::OK, &form, &errors);
    }

    let user_name = form.user_name.trim();
    let email = form.email.trim();

    let user = users.write().await.add(user_name, Some(email));
    let mut handle = sheet.lock().await.detached();

    let spreadsheet_id = match provision(&mut handle, &user, email).await {
        Ok(id) => id,
        Err(e) => {
            log::error!("❌ Failed to provision spreadsheet for {}: {}", user.user_id(), e);
            users.write().await.delete(user.user_id());
            let errors = vec![format!("Could not create the spreadsheet: {}", e)];
            return form_page(&hb, StatusCode::BAD_GATEWAY, &form, &errors);
        }
    };

    if let Err(e) = users.write().await.set_spreadsheet(user.user_id(), &spreadsheet_id) {
        log::error!("❌ Failed to link spreadsheet {}: {}", spreadsheet_id, e);
        return form_page(&hb, e.status_code(), &form, &[e.to_string()]);
    }

    log::info!("✅ User \"{}\" added with spreadsheet {}", user.user_name, spreadsheet_id);

    templates::render(
        &hb,
        StatusCode::OK,
        templates::SUCCESS,
        &json!({
            "message": format!("User \"{}\" added.", user.user_name),
            "user_name": user.user_name,
            "user_email": user.user_email,
            "user_id": user.user_id(),
            "spreadsheet_id": spreadsheet_id,
        }),
    )
}

#[utoipa::path(
    get,
    path = "/user/{user_id}",
    tag = "Users",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn get_user(
    users: web::Data<RwLock<UserRegistry>>,
    user_id: web::Path<String>,
) -> HttpResponse {
    log::info!("🔍 GET /user/{}", user_id);

    match users.read().await.get(&user_id) {
        Some(user) => HttpResponse::Ok().json(json!({ "success": true, "user": user })),
        None => HttpResponse::NotFound().json(json!({
            "success": false,
            "error": format!("User ID '{}' does not exist.", user_id)
        })),
    }
}

/// GET /user/lookup?name=
pub async fn lookup_user(
    users: web::Data<RwLock<UserRegistry>>,
    query: web::Query<LookupQuery>,
) -> HttpResponse {
    log::info!("🔍 GET /user/lookup?name={}", query.name);

    match users.read().await.get_by_name(&query.name) {
        Some(user) => HttpResponse::Ok().json(json!({ "success": true, "user": user })),
        None => HttpResponse::NotFound().json(json!({
            "success": false,
            "error": format!("No user named '{}'", query.name)
        })),
    }
}

/// DELETE /user/{user_id}. Succeeds whether or not the user existed.
pub async fn delete_user(
    users: web::Data<RwLock<UserRegistry>>,
    user_id: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️  DELETE /user/{}", user_id);

    users.write().await.delete(&user_id);
    HttpResponse::Ok().json(json!({ "success": true }))
}
