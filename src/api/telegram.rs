use crate::services::telegram_service::{SendFailure, TelegramBot, Update};
use actix_web::{web, HttpResponse};

/// POST /{bot_token}/echo
///
/// Echoes the incoming message back to its sender. Delivery failures are
/// reported in the body; the webhook itself always acknowledges with 200.
pub async fn echo_message(
    bot: web::Data<TelegramBot>,
    update: web::Json<Update>,
) -> HttpResponse {
    let update = update.into_inner();
    log::info!("🤖 Telegram update received: {:?}", update.update_id);

    let Some(chat_id) = update.chat_id() else {
        log::warn!("⚠️ Telegram update {:?} has no sender", update.update_id);
        return HttpResponse::Ok().json(SendFailure {
            ok: false,
            status_code: None,
            reason: "update has no sender".to_string(),
        });
    };

    match bot.send_message(chat_id, &update.echo_text()).await {
        Ok(ack) => HttpResponse::Ok().json(ack),
        Err(failure) => HttpResponse::Ok().json(failure),
    }
}
