//! Response classification.
//!
//! Responses carry no type header. The classifier renders the first
//! top-level value as text and looks for the quoted payload key of each
//! response kind; the key that appears earliest decides the kind.

use crate::error::{CodecError, CodecResult};
use crate::keys::{Field, KeyScheme};
use crate::response::{LogResponse, MessageResponse, ReadResponse, ResetMessagesResponse, WriteResponse};
use crate::value;
use crate::wrapper::ResponseWrapper;
use serde::Serialize;
use std::fmt;

/// Shape of a response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Register values, one top-level value.
    Read,
    /// Register write acknowledgement, one top-level value.
    Write,
    /// Per-message reset acknowledgement, one top-level value.
    ResetMessages,
    /// Stream of message records.
    Messages,
    /// Stream of log records.
    Logs,
}

impl ResponseKind {
    /// Kinds in the order their tags are checked.
    pub const CANDIDATES: [ResponseKind; 5] = [
        ResponseKind::Write,
        ResponseKind::ResetMessages,
        ResponseKind::Messages,
        ResponseKind::Read,
        ResponseKind::Logs,
    ];

    /// Payload key identifying this kind.
    pub fn tag(self) -> Field {
        match self {
            ResponseKind::Read => Field::Read,
            ResponseKind::Write => Field::Write,
            ResponseKind::ResetMessages => Field::ResetMessages,
            ResponseKind::Messages => Field::Message,
            ResponseKind::Logs => Field::LogEntries,
        }
    }

    /// Check if responses of this kind are streams of top-level values.
    pub fn is_stream(self) -> bool {
        matches!(self, ResponseKind::Messages | ResponseKind::Logs)
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseKind::Read => "read",
            ResponseKind::Write => "write",
            ResponseKind::ResetMessages => "reset_messages",
            ResponseKind::Messages => "messages",
            ResponseKind::Logs => "logs",
        };
        f.write_str(name)
    }
}

/// Select the candidate with the smallest offset. Equal smallest offsets
/// are ambiguous.
fn pick_earliest(
    candidates: impl IntoIterator<Item = (ResponseKind, usize)>,
) -> CodecResult<ResponseKind> {
    let mut best: Option<(ResponseKind, usize)> = None;
    let mut tied = false;

    for (kind, offset) in candidates {
        match best {
            Some((_, best_offset)) if offset > best_offset => {}
            Some((other, best_offset)) if offset == best_offset => {
                log::warn!("classifier tie at offset {}: {} and {}", offset, other, kind);
                tied = true;
            }
            _ => {
                best = Some((kind, offset));
                tied = false;
            }
        }
    }

    match best {
        Some((kind, _)) if !tied => Ok(kind),
        _ => Err(CodecError::UnclassifiableResponse),
    }
}

/// Classify rendered payload text.
pub(crate) fn classify_text(text: &str, scheme: KeyScheme) -> CodecResult<ResponseKind> {
    let offsets = ResponseKind::CANDIDATES.iter().filter_map(|kind| {
        let needle = format!("\"{}\"", kind.tag().token(scheme));
        text.find(&needle).map(|offset| (*kind, offset))
    });
    pick_earliest(offsets)
}

/// Determine which response kind `bytes` holds.
///
/// Only the first top-level value is inspected.
pub fn classify(bytes: &[u8], scheme: KeyScheme) -> CodecResult<ResponseKind> {
    let text = value::decode(bytes)?.render();
    let kind = classify_text(&text, scheme);
    log::debug!("classified {} bytes ({}) as {:?}", bytes.len(), scheme, kind);
    kind
}

/// Classify `bytes` and decode them with the matching decoder.
///
/// Stream kinds decode every top-level value; the other kinds decode only
/// the first one. An unclassifiable payload yields an empty wrapper; every
/// other failure is returned.
pub fn decode_response(bytes: &[u8], scheme: KeyScheme) -> CodecResult<ResponseWrapper> {
    let kind = match classify(bytes, scheme) {
        Ok(kind) => kind,
        Err(CodecError::UnclassifiableResponse) => return Ok(ResponseWrapper::default()),
        Err(e) => return Err(e),
    };

    if !kind.is_stream() {
        let mut rd = bytes;
        value::read_next(&mut rd)?;
        if !rd.is_empty() {
            log::warn!("ignoring {} bytes after a single {} response", rd.len(), kind);
        }
    }

    Ok(match kind {
        ResponseKind::Read => ReadResponse::decode(bytes, scheme)?.into(),
        ResponseKind::Write => WriteResponse::decode(bytes, scheme)?.into(),
        ResponseKind::ResetMessages => {
            WriteResponse::from(ResetMessagesResponse::decode(bytes, scheme)?).into()
        }
        ResponseKind::Messages => MessageResponse::decode_stream(bytes, scheme)?.into(),
        ResponseKind::Logs => LogResponse::decode_stream(bytes, scheme)?.into(),
    })
}
