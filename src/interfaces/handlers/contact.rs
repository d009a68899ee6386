use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    constants::MAX_BODY_BYTES,
    errors::{AppError, ValidationFailure},
    utils::get_client_ip::get_client_key,
    AppState,
};

/// `POST /api/contact`. The body is read by hand, after the configuration
/// and rate-limit checks, so that a malformed or oversized payload is still
/// answered with the contact schema's JSON errors.
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Payload,
) -> HttpResponse {
    let client_key = get_client_key(&req);
    let handler = &state.contact_handler;

    if let Err(e) = handler.admit(&client_key) {
        return e.to_http_response();
    }

    let body = match payload.to_bytes_limited(MAX_BODY_BYTES).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            // Unreadable bodies are judged as empty ones.
            tracing::warn!(client = %client_key, "Failed to read contact payload: {}", e);
            web::Bytes::new()
        }
        Err(_) => {
            tracing::warn!(client = %client_key, limit = MAX_BODY_BYTES, "Contact payload too large");
            return AppError::Validation(ValidationFailure::TooLong).to_http_response();
        }
    };

    match handler.deliver(&client_key, &body).await {
        Ok(accepted) => HttpResponse::Ok().json(accepted),
        Err(e) => e.to_http_response(),
    }
}
