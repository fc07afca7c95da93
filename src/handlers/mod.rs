pub mod auth;
pub mod inventory;
pub mod suppliers;

use axum::response::Json;
use serde::Serialize;

/// Success body: `{message?, data}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

pub fn data<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        message: None,
        data,
    })
}

pub fn with_message<T: Serialize>(message: &'static str, data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        message: Some(message),
        data,
    })
}

pub async fn index() -> &'static str {
    "Stockroom inventory API"
}
