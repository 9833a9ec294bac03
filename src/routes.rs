//! HTTP routes for reading the chain, recording checkouts and minting certificate ids.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppError;
use crate::model::{Block, Certificate, CheckoutPayload};
use crate::AppState;

/// Serialize with single-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

fn json_response(body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

fn plain_error(msg: &'static str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
}

/// GET /: every block, genesis first
pub async fn get_chain(State(state): State<AppState>) -> Result<Response, AppError> {
    let blocks = state.chain.snapshot();
    let body = to_pretty_json(&blocks)?;
    Ok(json_response(body))
}

/// POST /: record a checkout.
///
/// Answers 200 with the decoded payload even when the block is rejected;
/// rejections are only logged.
pub async fn write_block(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: CheckoutPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("could not write block: {e}");
            return plain_error("could not write block");
        }
    };

    match state.chain.append(payload.clone()) {
        Ok(block) => tracing::info!(
            position = block.position,
            hash = %block.hash,
            certificate_id = %block.payload.certificate_id,
            "block appended"
        ),
        Err(e) => tracing::warn!("block rejected: {e}"),
    }

    match to_pretty_json(&payload) {
        Ok(resp) => json_response(resp),
        Err(e) => {
            tracing::warn!("could not marshal payload: {e}");
            plain_error("could not write block")
        }
    }
}

/// POST /new: fill in a certificate's id from its ISBN and publish date
pub async fn new_certificate(body: Bytes) -> Response {
    let certificate: Certificate = match serde_json::from_slice(&body) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("could not create: {e}");
            return plain_error("could not create new certificate");
        }
    };

    let certificate = certificate.with_derived_id();
    match to_pretty_json(&certificate) {
        Ok(resp) => json_response(resp),
        Err(e) => {
            tracing::warn!("could not marshal payload: {e}");
            plain_error("could not save certificate data")
        }
    }
}

/// GET /blocks/:position
pub async fn get_block(
    State(state): State<AppState>,
    Path(position): Path<u64>,
) -> Result<Json<Block>, AppError> {
    state
        .chain
        .get(position)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("block {position}")))
}

/// GET /validate: re-check every link; returns { ok, length, errors[] }
#[derive(Serialize)]
pub struct ValidateResp {
    pub ok: bool,
    pub length: usize,
    pub errors: Vec<String>,
}
pub async fn validate_chain(State(state): State<AppState>) -> Json<ValidateResp> {
    let (length, errors) = state.chain.audit_with_len();
    Json(ValidateResp {
        ok: errors.is_empty(),
        length,
        errors,
    })
}

/// GET /health: liveness plus where the tail currently sits
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub length: usize,
    pub tip_position: u64,
}
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let (length, tip_position) = state.chain.head();
    Json(Health {
        status: "ok",
        length,
        tip_position,
    })
}
