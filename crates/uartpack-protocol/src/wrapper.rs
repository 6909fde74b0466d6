//! Tagged container for a decoded response.

use crate::response::{LogResponse, MessageResponse, ReadResponse, WriteResponse};
use serde::Serialize;

/// Outcome of [`crate::decode_response`]. At most one field is populated.
///
/// Reset responses are folded into `write`. A payload that matches no known
/// shape leaves every field empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseWrapper {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<ReadResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write: Option<WriteResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessageResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogResponse>>,
}

impl ResponseWrapper {
    /// Check if nothing was decoded.
    pub fn is_empty(&self) -> bool {
        self.read.is_none() && self.write.is_none() && self.messages.is_none() && self.logs.is_none()
    }

    /// Request id of the decoded response, taken from the first record of a
    /// stream.
    pub fn rid(&self) -> Option<i32> {
        if let Some(read) = &self.read {
            return Some(read.rid);
        }
        if let Some(write) = &self.write {
            return Some(write.rid);
        }
        if let Some(first) = self.messages.as_ref().and_then(|m| m.first()) {
            return Some(first.rid);
        }
        self.logs.as_ref().and_then(|l| l.first()).map(|l| l.rid)
    }
}

impl From<ReadResponse> for ResponseWrapper {
    fn from(read: ReadResponse) -> Self {
        ResponseWrapper {
            read: Some(read),
            ..Default::default()
        }
    }
}

impl From<WriteResponse> for ResponseWrapper {
    fn from(write: WriteResponse) -> Self {
        ResponseWrapper {
            write: Some(write),
            ..Default::default()
        }
    }
}

impl From<Vec<MessageResponse>> for ResponseWrapper {
    fn from(messages: Vec<MessageResponse>) -> Self {
        ResponseWrapper {
            messages: Some(messages),
            ..Default::default()
        }
    }
}

impl From<Vec<LogResponse>> for ResponseWrapper {
    fn from(logs: Vec<LogResponse>) -> Self {
        ResponseWrapper {
            logs: Some(logs),
            ..Default::default()
        }
    }
}
