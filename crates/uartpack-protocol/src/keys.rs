//! Wire key schemes.
//!
//! Every logical field of the protocol has two wire tokens: the long names
//! used by older firmware ([`KeyScheme::Legacy`]) and the abbreviated names
//! used by current firmware ([`KeyScheme::Current`]). The scheme is never
//! auto-detected; callers pass it to every encode, decode and classify call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects the wire token used for each [`Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    /// Long field names (`"timestamp"`, `"message"`, ...).
    Legacy,
    /// Abbreviated field names (`"T"`, `"M"`, ...).
    Current,
}

impl KeyScheme {
    /// Resolve the wire token for a field under this scheme.
    pub fn token(self, field: Field) -> &'static str {
        field.token(self)
    }
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyScheme::Legacy => write!(f, "legacy"),
            KeyScheme::Current => write!(f, "current"),
        }
    }
}

impl FromStr for KeyScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(KeyScheme::Legacy),
            "current" => Ok(KeyScheme::Current),
            other => Err(format!(
                "unknown key scheme '{}' (expected 'legacy' or 'current')",
                other
            )),
        }
    }
}

/// Logical protocol fields whose wire token depends on the [`KeyScheme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Request id, echoed in every response.
    Rid,
    /// Register read list / read result map.
    Read,
    /// Register write map / write result map.
    Write,
    /// Result code of a write.
    Result,
    /// Message retrieval query.
    ReadMessages,
    /// Message reset list / reset result map.
    ResetMessages,
    /// Log retrieval query.
    ReadLog,
    /// Number of items requested.
    Count,
    /// Six-component timestamp.
    Timestamp,
    /// A single streamed message.
    Message,
    /// Message id.
    MessageId,
    /// Timestamp at which a message occurred.
    Occurred,
    /// Timestamp at which a message was reset.
    Reset,
    /// Timestamp at which the root cause of a message disappeared.
    RootCauseDisappeared,
    /// End-of-list sentinel timestamp.
    EndOfList,
    /// A single streamed log entry.
    LogEntries,
    /// Per-register error code in a read result.
    Error,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 17] = [
        Field::Rid,
        Field::Read,
        Field::Write,
        Field::Result,
        Field::ReadMessages,
        Field::ResetMessages,
        Field::ReadLog,
        Field::Count,
        Field::Timestamp,
        Field::Message,
        Field::MessageId,
        Field::Occurred,
        Field::Reset,
        Field::RootCauseDisappeared,
        Field::EndOfList,
        Field::LogEntries,
        Field::Error,
    ];

    /// The (legacy, current) token pair for this field.
    pub const fn tokens(self) -> (&'static str, &'static str) {
        match self {
            Field::Rid => ("rid", "I"),
            Field::Read => ("read", "R"),
            Field::Write => ("write", "W"),
            Field::Result => ("result", "S"),
            Field::ReadMessages => ("readMessages", "RM"),
            Field::ResetMessages => ("resetMessages", "XM"),
            Field::ReadLog => ("readLog", "RL"),
            Field::Count => ("count", "C"),
            Field::Timestamp => ("timestamp", "T"),
            Field::Message => ("message", "M"),
            Field::MessageId => ("mid", "D"),
            // Firmware spelling.
            Field::Occurred => ("occured", "O"),
            Field::Reset => ("reset", "X"),
            Field::RootCauseDisappeared => ("rootcausedisappeared", "RC"),
            Field::EndOfList => ("endoflist", "E"),
            Field::LogEntries => ("logEntries", "L"),
            Field::Error => ("error", "ER"),
        }
    }

    /// Resolve the wire token for this field under `scheme`.
    pub const fn token(self, scheme: KeyScheme) -> &'static str {
        let (legacy, current) = self.tokens();
        match scheme {
            KeyScheme::Legacy => legacy,
            KeyScheme::Current => current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_resolve_per_scheme() {
        assert_eq!(Field::Timestamp.token(KeyScheme::Legacy), "timestamp");
        assert_eq!(Field::Timestamp.token(KeyScheme::Current), "T");
        assert_eq!(KeyScheme::Current.token(Field::Message), "M");
        assert_eq!(KeyScheme::Current.token(Field::LogEntries), "L");
        assert_eq!(KeyScheme::Legacy.token(Field::Occurred), "occured");
    }

    #[test]
    fn test_tokens_are_unique_within_a_scheme() {
        for scheme in [KeyScheme::Legacy, KeyScheme::Current] {
            let tokens: HashSet<_> = Field::ALL.iter().map(|f| f.token(scheme)).collect();
            assert_eq!(tokens.len(), Field::ALL.len(), "duplicate token in {}", scheme);
        }
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("legacy".parse::<KeyScheme>(), Ok(KeyScheme::Legacy));
        assert_eq!("CURRENT".parse::<KeyScheme>(), Ok(KeyScheme::Current));
        assert!("short".parse::<KeyScheme>().is_err());
        assert_eq!(KeyScheme::Current.to_string(), "current");
    }
}
