use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::RuntimeError;
use crate::ui::UiState;

/// The UI events the application responds to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Connect,
    Disconnect,
    SelectAllClasses,
    DeselectAllClasses,
    SelectAllTags,
    DeselectAllTags,
    Inference,
    Preview,
}

/// Where the event was triggered from.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub image_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw event as delivered by the host, before the command name is resolved.
#[derive(Deserialize, Debug, Clone)]
pub struct Event {
    pub command: String,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub state: Value,
}

/// A resolved event: a known command plus typed context and UI state.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub context: InvocationContext,
    pub state: UiState,
}

impl Invocation {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            context: InvocationContext::default(),
            state: UiState::default(),
        }
    }

    pub fn with_context(mut self, context: InvocationContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_state(mut self, state: UiState) -> Self {
        self.state = state;
        self
    }

    pub fn image_id(&self) -> Result<u64, RuntimeError> {
        self.context.image_id.ok_or(RuntimeError::MissingField("imageId"))
    }

    pub fn session_id(&self) -> Result<u64, RuntimeError> {
        self.state.session_id.ok_or(RuntimeError::MissingField("sessionId"))
    }
}

impl TryFrom<Event> for Invocation {
    type Error = RuntimeError;

    fn try_from(event: Event) -> Result<Self, Self::Error> {
        let command = event
            .command
            .parse::<Command>()
            .map_err(|_| RuntimeError::HandlerNotFound(event.command.clone()))?;

        let context = match event.context {
            Value::Null => InvocationContext::default(),
            context => serde_json::from_value(context)
                .map_err(|e| RuntimeError::InvalidState(format!("context: {e}")))?,
        };
        let state = match event.state {
            Value::Null => UiState::default(),
            state => serde_json::from_value(state)
                .map_err(|e| RuntimeError::InvalidState(format!("state: {e}")))?,
        };

        Ok(Self {
            command,
            context,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case("connect", Command::Connect)]
    #[case("select_all_classes", Command::SelectAllClasses)]
    #[case("deselect_all_tags", Command::DeselectAllTags)]
    #[case("preview", Command::Preview)]
    fn parses_event_names(#[case] name: &str, #[case] expected: Command) {
        assert_eq!(name.parse::<Command>().unwrap(), expected);
    }

    #[test]
    fn names_round_trip() {
        for command in Command::iter() {
            assert_eq!(command.to_string().parse::<Command>().unwrap(), command);
        }
    }

    #[test]
    fn unknown_command_is_rejected() {
        let event: Event = serde_json::from_value(json!({"command": "rollback"})).unwrap();
        let result = Invocation::try_from(event);
        assert!(matches!(result, Err(RuntimeError::HandlerNotFound(name)) if name == "rollback"));
    }

    #[test]
    fn event_resolves_context_and_state() {
        let event: Event = serde_json::from_value(json!({
            "command": "inference",
            "context": {"projectId": 10, "imageId": 7, "userId": 1},
            "state": {"sessionId": 55, "addMode": "replace"}
        }))
        .unwrap();

        let invocation = Invocation::try_from(event).unwrap();

        assert_eq!(invocation.command, Command::Inference);
        assert_eq!(invocation.image_id().unwrap(), 7);
        assert_eq!(invocation.session_id().unwrap(), 55);
        assert_eq!(invocation.context.extra["userId"], 1);
    }

    #[test]
    fn missing_ids_are_reported_by_name() {
        let invocation = Invocation::new(Command::Inference);
        assert!(matches!(
            invocation.image_id(),
            Err(RuntimeError::MissingField("imageId"))
        ));
        assert!(matches!(
            invocation.session_id(),
            Err(RuntimeError::MissingField("sessionId"))
        ));
    }
}
