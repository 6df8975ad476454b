//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{ErrorResponse, HealthResponse, TransformRequest, TransformResponse},
    ServiceError,
};
use tracing::{debug, warn};

use super::state::AppState;
use crate::codec::CodecError;
use crate::payload::{self, PayloadKind};

/// `POST /encrypt` — encrypt secret-code fields in the request payload.
///
/// The payload kind is named by the `X-Payload-Kind` request header (or the
/// configured header name). Secret-code fields are replaced with tokens.
pub async fn encrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TransformRequest>,
) -> Response {
    let kind = match payload_kind(&headers, &state.payload_kind_header) {
        Ok(k) => k,
        Err(e) => return error_response(&e),
    };

    let mut payload = req.payload;
    match payload::encrypt_fields(&state.codec, &mut payload, kind).await {
        Ok(fields) => {
            debug!(%kind, fields, "secret codes encrypted");
            (StatusCode::OK, Json(TransformResponse { payload })).into_response()
        }
        Err(e) => {
            warn!(%kind, kind_of_error = e.kind(), "encryption failed");
            let err = match e {
                CodecError::KeyDerivation(_) => ServiceError::Unavailable("codec key unavailable".into()),
                _ => ServiceError::EncryptionFailure("secret code could not be encrypted".into()),
            };
            error_response(&err)
        }
    }
}

/// `POST /decrypt` — decrypt secret-code fields in the request payload.
///
/// Undecryptable fields come back blank; this endpoint only fails on a bad
/// payload-kind header.
pub async fn decrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TransformRequest>,
) -> Response {
    let kind = match payload_kind(&headers, &state.payload_kind_header) {
        Ok(k) => k,
        Err(e) => return error_response(&e),
    };

    let mut payload = req.payload;
    let fields = payload::decrypt_fields(&state.codec, &mut payload, kind).await;
    debug!(%kind, fields, "secret codes decrypted");
    (StatusCode::OK, Json(TransformResponse { payload })).into_response()
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` once the codec key has been derived, `503` before that.
pub async fn health(State(state): State<AppState>) -> Response {
    let key_ready = state.codec.is_ready();

    let (status_code, status_str) = if key_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        key_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn payload_kind(headers: &HeaderMap, header_name: &str) -> Result<PayloadKind, ServiceError> {
    let value = headers
        .get(header_name)
        .ok_or_else(|| ServiceError::BadRequest(format!("missing {header_name} header")))?;
    let value = value.to_str().map_err(|_| {
        ServiceError::BadRequest(format!("{header_name} header contains non-ASCII characters"))
    })?;
    value
        .parse::<PayloadKind>()
        .map_err(|e| ServiceError::BadRequest(e.to_string()))
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
