mod api;
mod config;
mod gsheets;
mod logging;
mod middleware;
mod models;
mod services;
mod templates;
mod utils;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{dev::Service, error::InternalError, web, App, HttpResponse, HttpServer};
use config::AppConfig;
use dotenv::dotenv;
use models::EditResponse;
use services::{
    spreadsheet_service::Spreadsheet, telegram_service::TelegramBot, user_registry::UserRegistry,
};
use tokio::sync::{Mutex, RwLock};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("❌ Invalid configuration: {}", e);
        startup_error(e)
    })?;

    let _logging = logging::init_logging(&config.logging).map_err(|e| {
        eprintln!("❌ Failed to initialize logging: {}", e);
        startup_error(e)
    })?;

    log::info!("🚀 Starting {}...", env!("CARGO_PKG_NAME"));

    // Credentials are parsed here so a bad key stops the process before it binds.
    let sheet = Spreadsheet::from_credentials(
        &config.credentials,
        config.http_timeout,
        config.spreadsheet_id.clone(),
    )
    .map_err(|e| {
        log::error!("❌ Google API client could not be built: {}", e);
        startup_error(e)
    })?;

    match sheet.spreadsheet_id() {
        Some(id) => log::info!("📊 Default spreadsheet: {}", id),
        None => log::warn!("⚠️ GOOGLE_SHEET_ID is not set; /edit requests without user_id will fail"),
    }

    let hb = templates::registry().map_err(startup_error)?;

    let sheet_data = web::Data::new(Mutex::new(sheet));
    let users_data = web::Data::new(RwLock::new(UserRegistry::new()));
    let hb_data = web::Data::new(hb);

    let bot_data = config.telegram_bot_token.as_ref().map(|token| {
        web::Data::new(TelegramBot::new(
            token,
            &config.telegram_api_url,
            config.http_timeout,
        ))
    });
    let bot_path = config.telegram_bot_token.as_ref().map(|token| format!("/{}/echo", token));
    if bot_path.is_none() {
        log::warn!("⚠️ TELEGRAM_BOT_TOKEN is not set; the echo webhook is disabled");
    }

    let origins = config.cors_allowed_origins.clone();
    let (host, port) = (config.host.clone(), config.port);

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(EditResponse::failure(err.to_string()));
            InternalError::from_response(err, response).into()
        });

        let openapi = api::swagger::ApiDoc::openapi();
        let bot_data = bot_data.clone();
        let bot_path = bot_path.clone();

        App::new()
            .app_data(sheet_data.clone())
            .app_data(users_data.clone())
            .app_data(hb_data.clone())
            .app_data(json_config)
            .wrap(cors)
            .wrap(middleware::access_logger())
            .wrap_fn(|req, srv| {
                let fut = srv.call(req);
                async move {
                    let result = fut.await;
                    middleware::record_outcome(&result);
                    result
                }
            })
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .route("/", web::get().to(api::health::hello))
            .route("/health", web::get().to(api::health::health_check))
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // Users: "new" and "lookup" must precede the {user_id} catch-all
            .service(
                web::scope("/user")
                    .route("/new", web::get().to(api::users::new_user_form))
                    .route("/new", web::post().to(api::users::create_user))
                    .route("/lookup", web::get().to(api::users::lookup_user))
                    .route("/{user_id}", web::get().to(api::users::get_user))
                    .route("/{user_id}", web::delete().to(api::users::delete_user))
            )
            .service(
                web::scope("/edit")
                    .route("/{sheet_name}/append", web::post().to(api::edit::append_row))
                    .route("/{sheet_name}/records", web::get().to(api::edit::get_records))
                    .route("/{sheet_name}/{sheet_range}/append", web::post().to(api::edit::append_row_in_range))
                    .route("/{sheet_name}/{sheet_range}/records", web::get().to(api::edit::get_records_in_range))
            )
            .configure(move |cfg| {
                if let (Some(bot), Some(path)) = (bot_data, bot_path) {
                    cfg.app_data(bot)
                        .route(&path, web::post().to(api::telegram::echo_message));
                }
            })
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
