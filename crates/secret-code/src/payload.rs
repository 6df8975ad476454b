//! Secret-code fields inside JSON payloads.
//!
//! Each [`PayloadKind`] names one payload shape the serialization layer
//! exchanges and lists the dot-notation paths of its secret-code fields.
//! Array fields use the `[]` suffix, e.g. `"events[].secret_code"`.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use crate::codec::{CodecError, SecretCodeCodec};

/// Payload shapes that carry a secret code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Event-creation request: `{"secret_code": …}`.
    EventCreate,
    /// Event-update request; the field may be absent.
    EventUpdate,
    /// Volunteer authorization request.
    Authorization,
    /// Single-event response: `{"event": {"secret_code": …}}`.
    Event,
    /// Event-list response: `{"events": [{"secret_code": …}]}`.
    EventList,
}

impl PayloadKind {
    pub const ALL: [PayloadKind; 5] = [
        PayloadKind::EventCreate,
        PayloadKind::EventUpdate,
        PayloadKind::Authorization,
        PayloadKind::Event,
        PayloadKind::EventList,
    ];

    /// Header value naming this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadKind::EventCreate => "event_create",
            PayloadKind::EventUpdate => "event_update",
            PayloadKind::Authorization => "authorization",
            PayloadKind::Event => "event",
            PayloadKind::EventList => "event_list",
        }
    }

    /// Paths of the secret-code fields in this payload.
    pub fn field_paths(self) -> &'static [&'static str] {
        match self {
            PayloadKind::EventCreate | PayloadKind::EventUpdate | PayloadKind::Authorization => {
                &["secret_code"]
            }
            PayloadKind::Event => &["event.secret_code"],
            PayloadKind::EventList => &["events[].secret_code"],
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload-kind header named no known kind.
#[derive(Debug, Error)]
#[error("unknown payload kind: {0}")]
pub struct UnknownPayloadKind(pub String);

impl FromStr for PayloadKind {
    type Err = UnknownPayloadKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownPayloadKind(s.to_owned()))
    }
}

/// Segments of a dot-notation field path.
enum PathSegment<'a> {
    /// Navigate into an object property by name.
    Key(&'a str),
    /// Expand into every element of a JSON array.
    ArrayItem,
}

fn parse_path(path: &str) -> Vec<PathSegment<'_>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if let Some(key) = part.strip_suffix("[]") {
            segments.push(PathSegment::Key(key));
            segments.push(PathSegment::ArrayItem);
        } else {
            segments.push(PathSegment::Key(part));
        }
    }
    segments
}

/// Collect every string leaf reachable from `value` along `segments`.
/// Missing keys and non-string leaves are skipped.
fn collect_leaves<'v>(
    value: &'v mut Value,
    segments: &[PathSegment<'_>],
    out: &mut Vec<&'v mut String>,
) {
    let Some((head, rest)) = segments.split_first() else {
        if let Value::String(s) = value {
            out.push(s);
        }
        return;
    };

    match head {
        PathSegment::Key(key) => {
            if let Value::Object(map) = value {
                if let Some(child) = map.get_mut(*key) {
                    collect_leaves(child, rest, out);
                }
            }
        }
        PathSegment::ArrayItem => {
            if let Value::Array(items) = value {
                for item in items.iter_mut() {
                    collect_leaves(item, rest, out);
                }
            }
        }
    }
}

/// Encrypt every secret-code field of `payload` in place.
///
/// Returns the number of fields visited.
///
/// # Errors
///
/// Returns the first [`CodecError`] from the codec; fields already visited stay encrypted.
pub async fn encrypt_fields(
    codec: &SecretCodeCodec,
    payload: &mut Value,
    kind: PayloadKind,
) -> Result<usize, CodecError> {
    let mut visited = 0;
    for path in kind.field_paths() {
        let segments = parse_path(path);
        let mut leaves = Vec::new();
        collect_leaves(payload, &segments, &mut leaves);
        for leaf in leaves {
            let token = codec.encrypt_secret_code(leaf.as_str()).await?;
            *leaf = token;
            visited += 1;
        }
    }
    Ok(visited)
}

/// Decrypt every secret-code field of `payload` in place.
///
/// Fields that do not decrypt become `""`. Returns the number of fields visited.
pub async fn decrypt_fields(codec: &SecretCodeCodec, payload: &mut Value, kind: PayloadKind) -> usize {
    let mut visited = 0;
    for path in kind.field_paths() {
        let segments = parse_path(path);
        let mut leaves = Vec::new();
        collect_leaves(payload, &segments, &mut leaves);
        for leaf in leaves {
            let plain = codec.decrypt_secret_code(leaf.as_str()).await;
            *leaf = plain;
            visited += 1;
        }
    }
    visited
}
