//! Inbound commands to a fridge.
//!
//! The dispatcher vocabulary: a command name plus a JSON parameter bag, as
//! received from an API or a script, parsed into a [`FridgeCommand`] that
//! the [`FridgeService`](super::service::FridgeService) executes.
//!
//! | name                 | params                          |
//! |----------------------|---------------------------------|
//! | `toggle_compressor`  |                                 |
//! | `toggle_pulsetube`   |                                 |
//! | `toggle_turbo`       |                                 |
//! | `toggle_valve`       | `valve_name`                    |
//! | `toggle_heat_switch` | `heat_switch_name`              |
//! | `set_channel`        | `channel`, `value`              |
//! | `set_channels`       | `channels` (object name→value)  |

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DispatchError, Error};

pub type Params = Map<String, Value>;

/// Commands that external adapters can send to one fridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum FridgeCommand {
    ToggleCompressor,
    TogglePulsetube,
    ToggleTurbo,
    ToggleValve { valve_name: String },
    ToggleHeatSwitch { heat_switch_name: String },
    /// `value` stays raw until the store validates it.
    SetChannel { channel: String, value: Value },
    /// Several channels in one transition (scripted procedures).
    SetChannels { channels: Vec<(String, Value)> },
}

impl FridgeCommand {
    /// Parse a command name (trimmed, case-insensitive) and its parameters.
    pub fn parse(name: &str, params: &Params) -> Result<Self, DispatchError> {
        let cmd = match name.trim().to_ascii_lowercase().as_str() {
            "toggle_compressor" => Self::ToggleCompressor,
            "toggle_pulsetube" => Self::TogglePulsetube,
            "toggle_turbo" => Self::ToggleTurbo,
            "toggle_valve" => Self::ToggleValve {
                valve_name: name_param(params, "valve_name")?,
            },
            "toggle_heat_switch" => Self::ToggleHeatSwitch {
                heat_switch_name: name_param(params, "heat_switch_name")?,
            },
            "set_channel" => Self::SetChannel {
                channel: name_param(params, "channel")?,
                value: present(params, "value")?.clone(),
            },
            "set_channels" => {
                let Value::Object(map) = present(params, "channels")? else {
                    return Err(DispatchError::Rejected(Error::InvalidValue));
                };
                Self::SetChannels {
                    channels: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                }
            }
            _ => return Err(DispatchError::UnknownCommand),
        };
        Ok(cmd)
    }

    /// Canonical command name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ToggleCompressor => "toggle_compressor",
            Self::TogglePulsetube => "toggle_pulsetube",
            Self::ToggleTurbo => "toggle_turbo",
            Self::ToggleValve { .. } => "toggle_valve",
            Self::ToggleHeatSwitch { .. } => "toggle_heat_switch",
            Self::SetChannel { .. } => "set_channel",
            Self::SetChannels { .. } => "set_channels",
        }
    }
}

/// A parameter that must be present, non-null and not an empty string.
fn present<'a>(params: &'a Params, key: &'static str) -> Result<&'a Value, DispatchError> {
    match params.get(key) {
        None | Some(Value::Null) => Err(DispatchError::MissingParam(key)),
        Some(Value::String(s)) if s.is_empty() => Err(DispatchError::MissingParam(key)),
        Some(v) => Ok(v),
    }
}

/// A channel-name parameter.  Non-string values cannot name a channel.
fn name_param(params: &Params, key: &'static str) -> Result<String, DispatchError> {
    match present(params, key)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(DispatchError::Rejected(Error::UnknownChannel)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> Params {
        match v {
            Value::Object(m) => m,
            _ => Params::new(),
        }
    }

    #[test]
    fn names_are_trimmed_and_case_insensitive() {
        let empty = Params::new();
        assert_eq!(
            FridgeCommand::parse("  Toggle_Compressor \n", &empty),
            Ok(FridgeCommand::ToggleCompressor)
        );
        assert_eq!(
            FridgeCommand::parse("reboot", &empty),
            Err(DispatchError::UnknownCommand)
        );
    }

    #[test]
    fn required_params_are_checked() {
        let empty = Params::new();
        assert_eq!(
            FridgeCommand::parse("toggle_valve", &empty),
            Err(DispatchError::MissingParam("valve_name"))
        );
        assert_eq!(
            FridgeCommand::parse("toggle_heat_switch", &params(json!({"heat_switch_name": ""}))),
            Err(DispatchError::MissingParam("heat_switch_name"))
        );
        assert_eq!(
            FridgeCommand::parse("set_channel", &params(json!({"channel": "v5"}))),
            Err(DispatchError::MissingParam("value"))
        );
        assert_eq!(
            FridgeCommand::parse("set_channel", &params(json!({"channel": "v5", "value": null}))),
            Err(DispatchError::MissingParam("value"))
        );
        assert_eq!(
            FridgeCommand::parse("set_channel", &params(json!({"channel": "v5", "value": ""}))),
            Err(DispatchError::MissingParam("value"))
        );
        assert_eq!(
            FridgeCommand::parse("set_channels", &params(json!({"channels": ""}))),
            Err(DispatchError::MissingParam("channels"))
        );
        assert_eq!(
            FridgeCommand::parse("toggle_valve", &params(json!({"valve_name": 5}))),
            Err(DispatchError::Rejected(Error::UnknownChannel))
        );
    }

    #[test]
    fn parses_parameterised_commands() {
        assert_eq!(
            FridgeCommand::parse("toggle_valve", &params(json!({"valve_name": "v5"}))),
            Ok(FridgeCommand::ToggleValve {
                valve_name: "v5".into()
            })
        );
        let cmd = FridgeCommand::parse(
            "set_channel",
            &params(json!({"channel": "pulsetube", "value": "1"})),
        )
        .unwrap();
        assert_eq!(cmd.name(), "set_channel");
        assert_eq!(
            cmd,
            FridgeCommand::SetChannel {
                channel: "pulsetube".into(),
                value: json!("1")
            }
        );
    }

    #[test]
    fn set_channels_needs_an_object() {
        let cmd = FridgeCommand::parse(
            "set_channels",
            &params(json!({"channels": {"v5": 1, "compressor": "1"}})),
        )
        .unwrap();
        let FridgeCommand::SetChannels { channels } = cmd else {
            panic!("wrong variant");
        };
        assert_eq!(channels.len(), 2);
        assert_eq!(
            FridgeCommand::parse("set_channels", &params(json!({"channels": [1, 2]}))),
            Err(DispatchError::Rejected(Error::InvalidValue))
        );
    }

    #[test]
    fn serializes_with_command_tag() {
        let json = serde_json::to_value(FridgeCommand::ToggleValve {
            valve_name: "v9".into(),
        })
        .unwrap();
        assert_eq!(json, json!({"command": "toggle_valve", "valve_name": "v9"}));
    }
}
