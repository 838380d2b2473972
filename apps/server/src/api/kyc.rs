use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::post, Json, Router};
use tradedesk_core::{kyc::KycVerification, notifications::EmailMessage};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PanBody {
    pan: String,
    #[serde(default)]
    name: String,
    /// When present, the outcome is also emailed here.
    #[serde(default)]
    email: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct AadhaarBody {
    aadhaar_number: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: Option<String>,
}

/// Sends the KYC outcome in the background; delivery failures are only logged.
fn notify_kyc_status(
    state: &Arc<AppState>,
    to: Option<String>,
    name: String,
    result: &KycVerification,
) {
    let Some(to) = to.filter(|t| !t.trim().is_empty()) else {
        return;
    };
    let message = EmailMessage::kyc_status(to, &name, result);
    let client = state.email_client.clone();
    tokio::spawn(async move {
        if let Err(e) = client.send(&message).await {
            tracing::warn!("KYC status email to {} not sent: {}", message.to, e);
        }
    });
}

async fn verify_pan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PanBody>,
) -> Json<KycVerification> {
    let result = state.kyc_service.verify_pan(&body.pan, &body.name).await;
    notify_kyc_status(&state, body.email, body.name, &result);
    Json(result)
}

async fn verify_aadhaar(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AadhaarBody>,
) -> Json<KycVerification> {
    let result = state.kyc_service.verify_aadhaar(&body.aadhaar_number).await;
    notify_kyc_status(&state, body.email, body.name, &result);
    Json(result)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/kyc/pan", post(verify_pan))
        .route("/kyc/aadhaar", post(verify_aadhaar))
}
