//! Protocol constants
//!
//! Default register values, timestamp geometry and the fixed wire names of
//! the log telemetry fields. Keys that differ between the two key schemes
//! live in [`crate::keys`].

// ============================================================================
// Requests
// ============================================================================

/// Register that clears every active message when written.
pub const RESET_ALL_MESSAGES_REGISTER: i32 = 40053;
/// Value written to [`RESET_ALL_MESSAGES_REGISTER`].
pub const RESET_ALL_MESSAGES_VALUE: i32 = 1;
/// Default number of messages requested (0 = everything).
pub const DEFAULT_MESSAGE_COUNT: i32 = 0;
/// Default number of log entries requested.
pub const DEFAULT_LOG_COUNT: i32 = 500;

// ============================================================================
// Timestamps
// ============================================================================

/// Number of components in a device timestamp (yy, mm, dd, hh, mi, ss).
pub const TIMESTAMP_LEN: usize = 6;
/// Year the two-digit device year counts from.
pub const TIMESTAMP_EPOCH_YEAR: i32 = 2000;

// ============================================================================
// Log Telemetry Fields
// ============================================================================

/// Water temperature.
pub const LOG_TEMP: &str = "temp";
/// Relative dry-run pressure.
pub const LOG_RDP: &str = "rdp";
/// Proportional valve position.
pub const LOG_PROP_VALVE: &str = "prop-valve";
/// Relative tank pressure.
pub const LOG_TANK_REL: &str = "tank-rel";
/// Absolute tank pressure.
pub const LOG_TANK_ABS: &str = "tank-abs";
/// Flush cycle active.
pub const LOG_FLUSH: &str = "flush";
/// Supply valve failure counter.
pub const LOG_FAIL_SUP_VALVE: &str = "fail-sup-valve";
/// Display setpoint.
pub const LOG_SET_DISP: &str = "set-disp";
/// Control bandwidth.
pub const LOG_BANDW: &str = "bandw";
/// Per-pump operating modes.
pub const LOG_PUMP_MODES: &str = "pump-modes";
/// Inlet pressure.
pub const LOG_PRESS_IN: &str = "press-in";
/// Outlet pressure.
pub const LOG_PRESS_OUT: &str = "press-out";
/// Pressure setpoint.
pub const LOG_SET_PRESS: &str = "set-press";
/// Flow rate.
pub const LOG_FLOW: &str = "flow";
/// Pump speed.
pub const LOG_RPM: &str = "rpm";
/// Power consumption.
pub const LOG_POWER: &str = "power";
/// Controller state.
pub const LOG_STATE: &str = "state";
/// Active error code.
pub const LOG_ERROR: &str = "error";
/// Active warning code.
pub const LOG_WARNING: &str = "warning";
/// Supply valve position.
pub const LOG_SUP_VALVE: &str = "sup-valve";
/// Drain valve position.
pub const LOG_DRAIN_VALVE: &str = "drain-valve";
/// Accumulated run hours.
pub const LOG_RUN_HOURS: &str = "run-hours";
/// Pump start counter.
pub const LOG_STARTS: &str = "starts";
/// Dry-run protection tripped.
pub const LOG_DRY_RUN: &str = "dry-run";
/// Tank level sensor readings.
pub const LOG_LEVELS: &str = "levels";
