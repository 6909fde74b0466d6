//! Six-component device timestamps.

use crate::constants::{TIMESTAMP_EPOCH_YEAR, TIMESTAMP_LEN};
use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device timestamp as `[yy, mm, dd, hh, mi, ss]`, year counted from 2000.
///
/// The all-zero timestamp is used by the device to mark end-of-list records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DeviceTimestamp(pub [i32; TIMESTAMP_LEN]);

impl DeviceTimestamp {
    /// The all-zero timestamp.
    pub const ZERO: DeviceTimestamp = DeviceTimestamp([0; TIMESTAMP_LEN]);

    /// Create a timestamp from its components.
    pub const fn new(yy: i32, mm: i32, dd: i32, hh: i32, mi: i32, ss: i32) -> Self {
        DeviceTimestamp([yy, mm, dd, hh, mi, ss])
    }

    /// Create a timestamp from a slice that must hold exactly six components.
    pub fn from_slice(components: &[i32]) -> CodecResult<Self> {
        let parts: [i32; TIMESTAMP_LEN] =
            components
                .try_into()
                .map_err(|_| CodecError::InvalidTimestampLength {
                    actual: components.len(),
                })?;
        Ok(DeviceTimestamp(parts))
    }

    /// Read a timestamp out of a decoded array value.
    pub(crate) fn from_value(field: &str, value: &Value) -> CodecResult<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| CodecError::invalid_field(field, "expected an array"))?;
        let components = items
            .iter()
            .map(|item| {
                item.as_i32()
                    .ok_or_else(|| CodecError::invalid_field(field, "expected integer components"))
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Self::from_slice(&components)
    }

    /// Check if every component is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Components as a slice.
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    /// Interpret as a calendar date and time.
    ///
    /// Returns `None` for the zero timestamp and for components that do not
    /// form a valid date, including years past the calendar range.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let [yy, mm, dd, hh, mi, ss] = self.0;
        let date = NaiveDate::from_ymd_opt(
            TIMESTAMP_EPOCH_YEAR.checked_add(yy)?,
            u32::try_from(mm).ok()?,
            u32::try_from(dd).ok()?,
        )?;
        date.and_hms_opt(
            u32::try_from(hh).ok()?,
            u32::try_from(mi).ok()?,
            u32::try_from(ss).ok()?,
        )
    }

    /// Build a timestamp from a calendar date and time.
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        DeviceTimestamp([
            dt.year() - TIMESTAMP_EPOCH_YEAR,
            dt.month() as i32,
            dt.day() as i32,
            dt.hour() as i32,
            dt.minute() as i32,
            dt.second() as i32,
        ])
    }
}

impl From<[i32; TIMESTAMP_LEN]> for DeviceTimestamp {
    fn from(parts: [i32; TIMESTAMP_LEN]) -> Self {
        DeviceTimestamp(parts)
    }
}

impl From<DeviceTimestamp> for Vec<i32> {
    fn from(ts: DeviceTimestamp) -> Self {
        ts.0.to_vec()
    }
}

impl fmt::Display for DeviceTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [yy, mm, dd, hh, mi, ss] = self.0;
        write!(
            f,
            "{:02}-{:02}-{:02} {:02}:{:02}:{:02}",
            yy, mm, dd, hh, mi, ss
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_requires_six_components() {
        assert_eq!(
            DeviceTimestamp::from_slice(&[20, 1, 1, 1, 2, 46]).unwrap(),
            DeviceTimestamp::new(20, 1, 1, 1, 2, 46)
        );
        let err = DeviceTimestamp::from_slice(&[20, 1, 1, 1, 2]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidTimestampLength { actual: 5 }));
        let err = DeviceTimestamp::from_slice(&[0; 7]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidTimestampLength { actual: 7 }));
    }

    #[test]
    fn test_datetime_conversion() {
        let ts = DeviceTimestamp::new(22, 12, 28, 1, 45, 34);
        let dt = ts.to_datetime().unwrap();
        assert_eq!(dt.to_string(), "2022-12-28 01:45:34");
        assert_eq!(DeviceTimestamp::from_datetime(&dt), ts);

        assert!(DeviceTimestamp::ZERO.to_datetime().is_none());
        assert!(DeviceTimestamp::ZERO.is_zero());
    }

    #[test]
    fn test_out_of_range_year_has_no_datetime() {
        assert!(DeviceTimestamp::new(i32::MAX, 1, 1, 0, 0, 0).to_datetime().is_none());
        assert!(DeviceTimestamp::new(i32::MIN, 1, 1, 0, 0, 0).to_datetime().is_none());
        assert!(DeviceTimestamp::new(20, 13, 1, 0, 0, 0).to_datetime().is_none());
    }

    #[test]
    fn test_from_value() {
        let value = Value::array([20, 1, 1, 1, 2, 46]);
        let ts = DeviceTimestamp::from_value("occured", &value).unwrap();
        assert_eq!(ts.to_string(), "20-01-01 01:02:46");

        let err = DeviceTimestamp::from_value("occured", &Value::from(5)).unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { .. }));
    }
}
