//! UART MessagePack Protocol
//!
//! This crate encodes requests for, and decodes responses from, devices that
//! speak MessagePack over a serial link. Payloads are plain maps; the map
//! keys come from one of two [`KeyScheme`]s that the caller selects per call.
//!
//! # Protocol Overview
//!
//! - **Requests** (host → device): a two-entry map holding the request id and
//!   one payload entry (`read`, `write`, `resetMessages`, `readMessages`,
//!   `readLog`)
//! - **Responses** (device → host): carry no type header. [`classify`] finds
//!   the payload key that appears first and [`decode_response`] dispatches to
//!   the matching decoder
//! - **Streams**: message and log responses are several top-level values
//!   written back-to-back, closed by an end-of-list record
//!
//! Decoding keeps integers as integers and turns numeric string keys into
//! integer keys, so register maps survive a round trip unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use uartpack_protocol::{decode_response, encode_request, KeyScheme, ReadRequest};
//!
//! let bytes = encode_request(&ReadRequest::new(2, [41000, 41001]).into(), KeyScheme::Legacy)?;
//! let response = decode_response(&received, KeyScheme::Legacy)?;
//! if let Some(read) = response.read {
//!     println!("{:?}", read.get(41000));
//! }
//! ```

mod classify;
mod constants;
mod custom;
mod error;
mod fields;
mod hexdump;
mod keys;
mod request;
mod response;
mod stream;
mod timestamp;
pub mod value;
mod wrapper;

pub use classify::*;
pub use constants::*;
pub use custom::*;
pub use error::*;
pub use fields::RegisterMap;
pub use hexdump::*;
pub use keys::*;
pub use request::*;
pub use response::*;
pub use stream::*;
pub use timestamp::*;
pub use value::{number_from_token, Value};
pub use wrapper::*;
