//! Control message DTOs
//!
//! The out-of-band channel carries structured `{type}` commands and
//! replies over a per-message reply port. Commands decode once at the
//! boundary into a tagged enum; handlers never switch on raw strings.

use serde::{Deserialize, Serialize};

// == Control Command ==
/// A command delivered over the out-of-band message channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlCommand {
    /// Force immediate transition out of Waiting into Active
    SkipWaiting,
    /// Request a status snapshot of the current generation
    GetCacheStatus,
    /// Purge the current generation's partitions
    ClearCache,
}

// == Control Reply ==
/// Reply sent back through a command's reply port.
///
/// Untagged so each variant serializes to exactly the wire shape its
/// command expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlReply {
    /// Status snapshot, replying to `GET_CACHE_STATUS`
    Status(CacheStatus),
    /// Purge outcome, replying to `CLEAR_CACHE`
    Clear(ClearOutcome),
    /// Plain acknowledgement, replying to `SKIP_WAITING`
    Ack(Ack),
}

/// Status snapshot of the current cache generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    /// Number of payload records in the current generation
    pub cache_size: usize,
    /// Most recent recorded fetch time in epoch millis, 0 when none
    pub last_update: u64,
}

/// Outcome of a `CLEAR_CACHE` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
    /// Whether the purge completed
    pub success: bool,
    /// Failure detail when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClearOutcome {
    /// Successful purge.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed purge with detail.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Plain acknowledgement for commands without a dedicated reply shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Whether the command was applied
    pub ok: bool,
    /// Failure detail when `ok` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    /// Command applied.
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    /// Command rejected with detail.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_command_decodes_from_wire_schema() {
        let cmd: ControlCommand = serde_json::from_str(r#"{"type": "SKIP_WAITING"}"#).unwrap();
        assert_eq!(cmd, ControlCommand::SkipWaiting);

        let cmd: ControlCommand = serde_json::from_str(r#"{"type": "GET_CACHE_STATUS"}"#).unwrap();
        assert_eq!(cmd, ControlCommand::GetCacheStatus);

        let cmd: ControlCommand = serde_json::from_str(r#"{"type": "CLEAR_CACHE"}"#).unwrap();
        assert_eq!(cmd, ControlCommand::ClearCache);
    }

    #[test]
    fn test_unknown_command_type_rejected() {
        let result = serde_json::from_str::<ControlCommand>(r#"{"type": "SELF_DESTRUCT"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_reply_wire_shape() {
        let reply = ControlReply::Status(CacheStatus {
            cache_size: 7,
            last_update: 1_700_000_000_000,
        });

        let value: Value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value, json!({"cacheSize": 7, "lastUpdate": 1_700_000_000_000u64}));
    }

    #[test]
    fn test_clear_reply_omits_error_on_success() {
        let value: Value = serde_json::to_value(ControlReply::Clear(ClearOutcome::ok())).unwrap();
        assert_eq!(value, json!({"success": true}));

        let value: Value =
            serde_json::to_value(ControlReply::Clear(ClearOutcome::failed("store gone"))).unwrap();
        assert_eq!(value, json!({"success": false, "error": "store gone"}));
    }
}
