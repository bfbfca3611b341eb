//! The success envelope every route answers with.

use axum::Json;
use hearth_common::error::HearthResult;
use serde::Serialize;

/// `{ "message": "...", "result": ... }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub result: T,
}

pub type ApiResult<T> = HearthResult<Json<Envelope<T>>>;

/// Wrap `result` in the envelope.
pub fn reply<T: Serialize>(message: impl Into<String>, result: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        message: message.into(),
        result,
    }))
}
