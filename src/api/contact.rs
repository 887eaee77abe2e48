//! Contact and donation form endpoints
//!
//! Submissions are relayed by email, never stored. The handler answers 202
//! once the relay accepts the message.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::services::email::{ContactMessage, DonationInquiry};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(send_contact))
        .route("/donations", post(send_donation_inquiry))
}

/// POST /api/v1/contact - Relay a contact form submission
async fn send_contact(
    State(state): State<AppState>,
    Json(message): Json<ContactMessage>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    state.email_service.send_contact(&message).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "accepted" })),
    ))
}

/// POST /api/v1/donations - Relay a donation inquiry
async fn send_donation_inquiry(
    State(state): State<AppState>,
    Json(inquiry): Json<DonationInquiry>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    state.email_service.send_donation_inquiry(&inquiry).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "accepted" })),
    ))
}
