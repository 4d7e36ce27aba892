use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::handlers::BehaviorObservation;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TelemetryEvent {
    pub name: String,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub contract_id: Option<String>,
    #[serde(default)]
    pub contract_session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorFrame {
    #[serde(rename = "Behaviors")]
    pub behaviors: Vec<BehaviorObservation>,
}

#[derive(Debug, Clone)]
pub enum IncomingMessage {
    Telemetry(TelemetryEvent),
    Behaviors(BehaviorFrame),
}

pub fn parse_incoming_message(text: &str) -> Result<IncomingMessage> {
    if let Ok(event) = serde_json::from_str::<TelemetryEvent>(text) {
        return Ok(IncomingMessage::Telemetry(event));
    }

    if let Ok(frame) = serde_json::from_str::<BehaviorFrame>(text) {
        return Ok(IncomingMessage::Behaviors(frame));
    }

    Err(anyhow!(
        "payload did not match telemetry event or behavior frame"
    ))
}

#[cfg(test)]
mod tests {
    use super::{parse_incoming_message, IncomingMessage};

    #[test]
    fn parses_telemetry_event() {
        let payload = r#"{
            "Name":"Kill",
            "Timestamp":12.5,
            "ContractSessionId":"2519-abc",
            "Value":{"RepositoryId":"guard-1","ActorType":1}
        }"#;

        let parsed = parse_incoming_message(payload).expect("expected telemetry parse");
        match parsed {
            IncomingMessage::Telemetry(event) => {
                assert_eq!(event.name, "Kill");
                assert_eq!(event.timestamp, 12.5);
                assert_eq!(event.value["ActorType"], 1);
                assert_eq!(event.contract_session_id.as_deref(), Some("2519-abc"));
                assert!(event.contract_id.is_none());
            }
            _ => panic!("expected telemetry event"),
        }
    }

    #[test]
    fn telemetry_without_value_defaults_to_null() {
        let parsed = parse_incoming_message(r#"{"Name":"ContractEnd","Timestamp":80}"#)
            .expect("expected telemetry parse");
        match parsed {
            IncomingMessage::Telemetry(event) => assert!(event.value.is_null()),
            _ => panic!("expected telemetry event"),
        }
    }

    #[test]
    fn parses_behavior_frame() {
        let payload = r#"{
            "Behaviors":[
                {"RepositoryId":"Guard-1","Behavior":"BT_CloseCombat"},
                {"RepositoryId":"cook","Behavior":"BT_Idle"}
            ]
        }"#;

        let parsed = parse_incoming_message(payload).expect("expected behavior frame parse");
        match parsed {
            IncomingMessage::Behaviors(frame) => {
                assert_eq!(frame.behaviors.len(), 2);
                assert_eq!(frame.behaviors[0].repository_id.as_str(), "guard-1");
                assert_eq!(frame.behaviors[0].behavior, "BT_CloseCombat");
            }
            _ => panic!("expected behavior frame"),
        }
    }

    #[test]
    fn rejects_unrecognized_payload() {
        let payload = r#"{"hello":"world"}"#;
        let parsed = parse_incoming_message(payload);
        assert!(parsed.is_err());
    }
}
