//! Responses received from the device.
//!
//! Read, write and reset responses arrive as a single top-level value.
//! Messages and log entries are streamed: the device writes one top-level
//! value per record, back-to-back, and the last record is an end-of-list
//! sentinel.

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::fields::{self, int_list, register_map, require, root_map, to_i64, RegisterMap};
use crate::keys::{Field, KeyScheme};
use crate::timestamp::DeviceTimestamp;
use crate::value::{self, Value};
use serde::Serialize;

/// Decode every top-level value in `bytes` with `decode_one`.
fn decode_stream_with<T>(
    bytes: &[u8],
    scheme: KeyScheme,
    decode_one: impl Fn(&Value, KeyScheme) -> CodecResult<T>,
) -> CodecResult<Vec<T>> {
    let mut rd = bytes;
    let mut records = Vec::new();
    while !rd.is_empty() {
        let value = value::read_next(&mut rd)?;
        log::trace!("stream value {}: {}", records.len(), value);
        records.push(decode_one(&value, scheme)?);
    }
    Ok(records)
}

fn optional_timestamp(value: &Value, scheme: KeyScheme, field: Field) -> CodecResult<Option<DeviceTimestamp>> {
    fields::optional(value, scheme, field)
        .map(|ts| DeviceTimestamp::from_value(field.token(scheme), ts))
        .transpose()
}

// ============================================================================
// Register Responses
// ============================================================================

/// A register whose read failed on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisterError {
    /// Register number.
    pub register: i64,
    /// Device error code.
    pub code: i64,
}

/// Result of a [`crate::ReadRequest`].
///
/// Each register maps either to its value or to an `{error: code}` map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResponse {
    /// Request id.
    pub rid: i32,
    /// Register values.
    pub read: RegisterMap,
}

impl ReadResponse {
    /// Decode the first top-level value of `bytes`.
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        Self::from_value(&value::decode(bytes)?, scheme)
    }

    pub(crate) fn from_value(root: &Value, scheme: KeyScheme) -> CodecResult<Self> {
        root_map(root, "read response")?;
        Ok(ReadResponse {
            rid: fields::rid(root, scheme)?,
            read: register_map(Field::Read.token(scheme), require(root, scheme, Field::Read)?)?,
        })
    }

    /// Value of a single register.
    pub fn get(&self, register: i64) -> Option<&Value> {
        self.read.get(&register)
    }

    /// Registers the device reported as failed.
    pub fn errors(&self, scheme: KeyScheme) -> Vec<RegisterError> {
        let token = Field::Error.token(scheme);
        self.read
            .iter()
            .filter_map(|(register, value)| {
                value.get(token).and_then(Value::as_i64).map(|code| RegisterError {
                    register: *register,
                    code,
                })
            })
            .collect()
    }
}

/// Result of a [`crate::WriteRequest`] or a reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteResponse {
    /// Request id.
    pub rid: i32,
    /// Overall result code, when the device sends one.
    pub result: Option<i64>,
    /// Per-register result.
    pub write: RegisterMap,
}

impl WriteResponse {
    /// Decode the first top-level value of `bytes`.
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        Self::from_value(&value::decode(bytes)?, scheme)
    }

    pub(crate) fn from_value(root: &Value, scheme: KeyScheme) -> CodecResult<Self> {
        root_map(root, "write response")?;
        let result = fields::optional(root, scheme, Field::Result)
            .map(|v| to_i64(Field::Result.token(scheme), v))
            .transpose()?;
        Ok(WriteResponse {
            rid: fields::rid(root, scheme)?,
            result,
            write: register_map(Field::Write.token(scheme), require(root, scheme, Field::Write)?)?,
        })
    }
}

/// Result of a [`crate::ResetMessagesByIdRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetMessagesResponse {
    /// Request id.
    pub rid: i32,
    /// Per-message result.
    pub reset_messages: RegisterMap,
}

impl ResetMessagesResponse {
    /// Decode the first top-level value of `bytes`.
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        Self::from_value(&value::decode(bytes)?, scheme)
    }

    pub(crate) fn from_value(root: &Value, scheme: KeyScheme) -> CodecResult<Self> {
        root_map(root, "reset response")?;
        Ok(ResetMessagesResponse {
            rid: fields::rid(root, scheme)?,
            reset_messages: register_map(
                Field::ResetMessages.token(scheme),
                require(root, scheme, Field::ResetMessages)?,
            )?,
        })
    }
}

impl From<ResetMessagesResponse> for WriteResponse {
    fn from(reset: ResetMessagesResponse) -> Self {
        WriteResponse {
            rid: reset.rid,
            result: None,
            write: reset.reset_messages,
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// What happened to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The message became active.
    Occurred,
    /// The message was reset.
    Reset,
    /// The condition causing the message went away.
    RootCauseDisappeared,
    /// Sentinel closing the message list.
    EndOfList,
}

/// A single device message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Message id.
    pub mid: i64,
    /// When the message became active.
    pub occurred: Option<DeviceTimestamp>,
    /// When the message was reset.
    pub reset: Option<DeviceTimestamp>,
    /// When the condition behind the message went away.
    pub root_cause_disappeared: Option<DeviceTimestamp>,
    /// Set only on the sentinel closing the message list.
    pub end_of_list: Option<DeviceTimestamp>,
}

impl Message {
    /// Kind of the message, taken from the first timestamp present.
    pub fn kind(&self) -> Option<MessageKind> {
        if self.occurred.is_some() {
            Some(MessageKind::Occurred)
        } else if self.reset.is_some() {
            Some(MessageKind::Reset)
        } else if self.root_cause_disappeared.is_some() {
            Some(MessageKind::RootCauseDisappeared)
        } else if self.end_of_list.is_some() {
            Some(MessageKind::EndOfList)
        } else {
            None
        }
    }

    /// Timestamp matching [`Message::kind`].
    pub fn timestamp(&self) -> Option<DeviceTimestamp> {
        self.occurred
            .or(self.reset)
            .or(self.root_cause_disappeared)
            .or(self.end_of_list)
    }

    /// Check if this is the end-of-list sentinel.
    pub fn is_end_of_list(&self) -> bool {
        self.kind() == Some(MessageKind::EndOfList)
    }

    pub(crate) fn from_value(value: &Value, scheme: KeyScheme) -> CodecResult<Self> {
        root_map(value, Field::Message.token(scheme))?;
        let mid = to_i64(
            Field::MessageId.token(scheme),
            require(value, scheme, Field::MessageId)?,
        )?;
        let message = Message {
            mid,
            occurred: optional_timestamp(value, scheme, Field::Occurred)?,
            reset: optional_timestamp(value, scheme, Field::Reset)?,
            root_cause_disappeared: optional_timestamp(value, scheme, Field::RootCauseDisappeared)?,
            end_of_list: optional_timestamp(value, scheme, Field::EndOfList)?,
        };
        if message.kind().is_none() {
            return Err(CodecError::UnknownMessageKind { mid });
        }
        Ok(message)
    }
}

/// One streamed message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    /// Request id.
    pub rid: i32,
    /// The message.
    pub message: Message,
}

impl MessageResponse {
    /// Decode the first top-level value of `bytes`.
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        Self::from_value(&value::decode(bytes)?, scheme)
    }

    /// Decode every record in a message stream.
    pub fn decode_stream(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Vec<Self>> {
        decode_stream_with(bytes, scheme, Self::from_value)
    }

    pub(crate) fn from_value(root: &Value, scheme: KeyScheme) -> CodecResult<Self> {
        root_map(root, "message response")?;
        Ok(MessageResponse {
            rid: fields::rid(root, scheme)?,
            message: Message::from_value(require(root, scheme, Field::Message)?, scheme)?,
        })
    }
}

// ============================================================================
// Logs
// ============================================================================

/// One log record.
///
/// Telemetry names are the same under both key schemes. Fields the device
/// did not report are `None`; unknown names are skipped. Scalar readings
/// keep their wire type, so an integer stays `Int`/`Long` and a float
/// stays `Double`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogEntries {
    /// When the record was taken. All zero if the device omitted it.
    pub timestamp: DeviceTimestamp,
    /// Temperature.
    pub temp: Option<Value>,
    /// `rdp` reading.
    pub rdp: Option<Value>,
    /// Proportional valve position.
    pub prop_valve: Option<Value>,
    /// Tank level, relative.
    pub tank_rel: Option<Value>,
    /// Tank level, absolute.
    pub tank_abs: Option<Value>,
    /// Flush reading.
    pub flush: Option<Value>,
    /// Supply valve failure reading.
    pub fail_sup_valve: Option<Value>,
    /// Displayed setpoint.
    pub set_disp: Option<Value>,
    /// Control bandwidth.
    pub bandw: Option<Value>,
    /// Pump mode list.
    pub pump_modes: Option<Vec<i64>>,
    /// Inlet pressure.
    pub press_in: Option<Value>,
    /// Outlet pressure.
    pub press_out: Option<Value>,
    /// Pressure setpoint.
    pub set_press: Option<Value>,
    /// Flow.
    pub flow: Option<Value>,
    /// Pump speed.
    pub rpm: Option<Value>,
    /// Power draw.
    pub power: Option<Value>,
    /// Device state code.
    pub state: Option<Value>,
    /// Active error code.
    pub error: Option<Value>,
    /// Active warning code.
    pub warning: Option<Value>,
    /// Supply valve state.
    pub sup_valve: Option<Value>,
    /// Drain valve state.
    pub drain_valve: Option<Value>,
    /// Running hours.
    pub run_hours: Option<Value>,
    /// Start counter.
    pub starts: Option<Value>,
    /// Dry-run counter.
    pub dry_run: Option<Value>,
    /// Level list.
    pub levels: Option<Vec<i64>>,
    /// Present only on the sentinel closing the log.
    pub end_of_list: Option<DeviceTimestamp>,
}

/// A scalar telemetry reading: an integer or a float.
fn telemetry_scalar(name: &str, value: &Value) -> CodecResult<Option<Value>> {
    if value.is_integer() || value.is_float() {
        Ok(Some(value.clone()))
    } else {
        Err(CodecError::invalid_field(
            name,
            format!("expected a number, got {}", value.type_name()),
        ))
    }
}

impl LogEntries {
    /// Telemetry fields the device reported, by wire name.
    pub fn telemetry(&self) -> Vec<(&'static str, Value)> {
        let scalars = [
            (LOG_TEMP, &self.temp),
            (LOG_RDP, &self.rdp),
            (LOG_PROP_VALVE, &self.prop_valve),
            (LOG_TANK_REL, &self.tank_rel),
            (LOG_TANK_ABS, &self.tank_abs),
            (LOG_FLUSH, &self.flush),
            (LOG_FAIL_SUP_VALVE, &self.fail_sup_valve),
            (LOG_SET_DISP, &self.set_disp),
            (LOG_BANDW, &self.bandw),
            (LOG_PRESS_IN, &self.press_in),
            (LOG_PRESS_OUT, &self.press_out),
            (LOG_SET_PRESS, &self.set_press),
            (LOG_FLOW, &self.flow),
            (LOG_RPM, &self.rpm),
            (LOG_POWER, &self.power),
            (LOG_STATE, &self.state),
            (LOG_ERROR, &self.error),
            (LOG_WARNING, &self.warning),
            (LOG_SUP_VALVE, &self.sup_valve),
            (LOG_DRAIN_VALVE, &self.drain_valve),
            (LOG_RUN_HOURS, &self.run_hours),
            (LOG_STARTS, &self.starts),
            (LOG_DRY_RUN, &self.dry_run),
        ];
        let mut present: Vec<(&'static str, Value)> = scalars
            .into_iter()
            .filter_map(|(name, v)| v.as_ref().map(|v| (name, v.clone())))
            .collect();
        for (name, list) in [(LOG_PUMP_MODES, &self.pump_modes), (LOG_LEVELS, &self.levels)] {
            if let Some(list) = list {
                present.push((name, Value::array(list.iter().copied())));
            }
        }
        present
    }

    /// Check if this record is the sentinel closing the log: no telemetry,
    /// an end-of-list marker, and a zero timestamp.
    pub fn is_end_of_list_message(&self) -> bool {
        self.telemetry().is_empty() && self.end_of_list.is_some() && self.timestamp.is_zero()
    }

    pub(crate) fn from_value(value: &Value, scheme: KeyScheme) -> CodecResult<Self> {
        let timestamp_token = Field::Timestamp.token(scheme);
        let end_token = Field::EndOfList.token(scheme);
        let mut entry = LogEntries::default();

        for (key, val) in root_map(value, Field::LogEntries.token(scheme))? {
            let Some(name) = key.as_str() else {
                log::trace!("skipping non-text log key {}", key);
                continue;
            };
            if name == timestamp_token {
                entry.timestamp = DeviceTimestamp::from_value(name, val)?;
                continue;
            }
            if name == end_token {
                entry.end_of_list = Some(DeviceTimestamp::from_value(name, val)?);
                continue;
            }
            match name {
                LOG_TEMP => entry.temp = telemetry_scalar(name, val)?,
                LOG_RDP => entry.rdp = telemetry_scalar(name, val)?,
                LOG_PROP_VALVE => entry.prop_valve = telemetry_scalar(name, val)?,
                LOG_TANK_REL => entry.tank_rel = telemetry_scalar(name, val)?,
                LOG_TANK_ABS => entry.tank_abs = telemetry_scalar(name, val)?,
                LOG_FLUSH => entry.flush = telemetry_scalar(name, val)?,
                LOG_FAIL_SUP_VALVE => entry.fail_sup_valve = telemetry_scalar(name, val)?,
                LOG_SET_DISP => entry.set_disp = telemetry_scalar(name, val)?,
                LOG_BANDW => entry.bandw = telemetry_scalar(name, val)?,
                LOG_PUMP_MODES => entry.pump_modes = Some(int_list(name, val)?),
                LOG_PRESS_IN => entry.press_in = telemetry_scalar(name, val)?,
                LOG_PRESS_OUT => entry.press_out = telemetry_scalar(name, val)?,
                LOG_SET_PRESS => entry.set_press = telemetry_scalar(name, val)?,
                LOG_FLOW => entry.flow = telemetry_scalar(name, val)?,
                LOG_RPM => entry.rpm = telemetry_scalar(name, val)?,
                LOG_POWER => entry.power = telemetry_scalar(name, val)?,
                LOG_STATE => entry.state = telemetry_scalar(name, val)?,
                LOG_ERROR => entry.error = telemetry_scalar(name, val)?,
                LOG_WARNING => entry.warning = telemetry_scalar(name, val)?,
                LOG_SUP_VALVE => entry.sup_valve = telemetry_scalar(name, val)?,
                LOG_DRAIN_VALVE => entry.drain_valve = telemetry_scalar(name, val)?,
                LOG_RUN_HOURS => entry.run_hours = telemetry_scalar(name, val)?,
                LOG_STARTS => entry.starts = telemetry_scalar(name, val)?,
                LOG_DRY_RUN => entry.dry_run = telemetry_scalar(name, val)?,
                LOG_LEVELS => entry.levels = Some(int_list(name, val)?),
                other => log::trace!("skipping unknown log field '{}'", other),
            }
        }
        Ok(entry)
    }
}

/// One streamed log record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogResponse {
    /// Request id.
    pub rid: i32,
    /// The record.
    pub log_entries: LogEntries,
}

impl LogResponse {
    /// Decode the first top-level value of `bytes`.
    pub fn decode(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Self> {
        Self::from_value(&value::decode(bytes)?, scheme)
    }

    /// Decode every record in a log stream.
    pub fn decode_stream(bytes: &[u8], scheme: KeyScheme) -> CodecResult<Vec<Self>> {
        decode_stream_with(bytes, scheme, Self::from_value)
    }

    pub(crate) fn from_value(root: &Value, scheme: KeyScheme) -> CodecResult<Self> {
        root_map(root, "log response")?;
        Ok(LogResponse {
            rid: fields::rid(root, scheme)?,
            log_entries: LogEntries::from_value(require(root, scheme, Field::LogEntries)?, scheme)?,
        })
    }
}
