//! Messaging webhook handler
//!
//! Events in one delivery are processed sequentially, in delivery order. A
//! failure in one event is logged and answered with the generic failure reply;
//! the rest of the batch still runs and the platform always gets 200.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::line::{self, Event, MessageContent, WebhookBody, SIGNATURE_HEADER};
use crate::{AppError, AppState};
use aom_core::ResponseIntent;

/// POST /webhook - Receive a batch of platform events
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    if let Some(secret) = state.config.channel_secret.as_deref() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !line::verify_signature(secret, &body, signature) {
            warn!("Rejected webhook with invalid signature");
            return Err(AppError::unauthorized("Invalid signature"));
        }
    }

    let payload: WebhookBody =
        serde_json::from_slice(&body).map_err(|_| AppError::bad_request("Invalid JSON"))?;
    debug!(events = payload.events.len(), "Webhook delivery");

    for event in payload.events {
        process_event(&state, event).await;
    }

    Ok(StatusCode::OK)
}

async fn process_event(state: &AppState, event: Event) {
    match event {
        Event::Message(ev) => {
            let MessageContent::Text { text } = ev.message else {
                debug!("Ignoring non-text message");
                return;
            };
            let Some(user_id) = ev.source.user_id else {
                return;
            };
            let intent = classify(state, &user_id, &text);
            reply(state, ev.reply_token.as_deref(), intent).await;
        }
        Event::Postback(ev) => {
            let Some(user_id) = ev.source.user_id else {
                return;
            };
            let intent = classify(state, &user_id, &ev.postback.data);
            reply(state, ev.reply_token.as_deref(), intent).await;
        }
        Event::Follow(ev) => {
            let Some(user_id) = ev.source.user_id else {
                return;
            };
            let intent = welcome(state, &user_id).await;
            reply(state, ev.reply_token.as_deref(), Some(intent)).await;
        }
        Event::Other => {}
    }
}

/// Run text through the chat engine, turning failures into the failure reply
fn classify(state: &AppState, user_id: &str, text: &str) -> Option<ResponseIntent> {
    match state.engine.handle_text(user_id, text, Utc::now()) {
        Ok(intent) => intent,
        Err(e) => {
            error!(user_id, error = %e, "Failed to handle message");
            Some(ResponseIntent::Failure)
        }
    }
}

async fn welcome(state: &AppState, user_id: &str) -> ResponseIntent {
    let profile = match state.messenger.profile(user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(user_id, error = %e, "Failed to fetch profile");
            None
        }
    };

    let intent = state.engine.welcome(
        user_id,
        profile.as_ref().map(|p| p.display_name.as_str()),
        profile.as_ref().and_then(|p| p.picture_url.as_deref()),
        Utc::now(),
    );
    let intent = match intent {
        Ok(intent) => intent,
        Err(e) => {
            error!(user_id, error = %e, "Failed to register follower");
            return ResponseIntent::Failure;
        }
    };
    info!(user_id, "New follower");

    if let Some(menu_id) = state.engine.config().rich_menu("main") {
        if let Err(e) = state.messenger.link_rich_menu(user_id, menu_id).await {
            warn!(user_id, error = %e, "Failed to link rich menu");
        }
    }
    intent
}

async fn reply(state: &AppState, reply_token: Option<&str>, intent: Option<ResponseIntent>) {
    let (Some(token), Some(intent)) = (reply_token, intent) else {
        return;
    };
    let messages = line::render(&intent);
    if let Err(e) = state.messenger.reply(token, &messages).await {
        warn!(intent = intent.name(), error = %e, "Failed to send reply");
    }
}
