//! Flow events and toast notifications, fanned out over a broadcast channel.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::ValidationError;
use crate::flow::page::Page;
use crate::interview::session::InterviewPhase;
use crate::interview::transcript::TranscriptMessage;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// How loudly a toast should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Destructive,
}

/// A transient user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Toast {
    pub fn new(title: &str, description: &str, severity: Severity) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            severity,
        }
    }

    pub fn missing_information() -> Self {
        Self::new(
            "Missing Information",
            "Please fill in all fields to continue.",
            Severity::Destructive,
        )
    }

    pub fn invalid_email() -> Self {
        Self::new(
            "Invalid Email",
            "Please enter a valid email address.",
            Severity::Destructive,
        )
    }

    pub fn interview_too_short() -> Self {
        Self::new(
            "Interview Too Short",
            "Please continue the interview for more comprehensive feedback.",
            Severity::Destructive,
        )
    }

    pub fn submitted() -> Self {
        Self::new(
            "Interview Submitted!",
            "Your responses have been analyzed. Redirecting to results...",
            Severity::Normal,
        )
    }

    pub fn submission_failed() -> Self {
        Self::new(
            "Submission Error",
            "Failed to submit interview. Please try again.",
            Severity::Destructive,
        )
    }

    /// Toast for the voice toggle, given the state it switched *to*.
    pub fn listening(now_listening: bool) -> Self {
        if now_listening {
            Self::new("Started Listening", "Speak your answer now", Severity::Normal)
        } else {
            Self::new("Stopped Listening", "Voice input disabled", Severity::Normal)
        }
    }
}

impl From<&ValidationError> for Toast {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::MissingFields { .. } => Self::missing_information(),
            ValidationError::InvalidEmail { .. } => Self::invalid_email(),
            ValidationError::TranscriptTooShort { .. } => Self::interview_too_short(),
        }
    }
}

/// Everything a connected page may want to react to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    Toast { toast: Toast },
    MessageAppended { message: TranscriptMessage },
    PhaseChanged { phase: InterviewPhase },
    Navigate { to: Page },
}

/// Broadcast fan-out of [`FlowEvent`]s. Cheap to clone.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FlowEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.tx.subscribe()
    }

    /// Send to all subscribers. Fine if nobody is listening.
    pub fn emit(&self, event: FlowEvent) {
        debug!(?event, "Flow event");
        let _ = self.tx.send(event);
    }

    pub fn toast(&self, toast: Toast) {
        self.emit(FlowEvent::Toast { toast });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_json_shape() {
        let event = FlowEvent::Toast {
            toast: Toast::submission_failed(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "toast");
        assert_eq!(json["toast"]["title"], "Submission Error");
        assert_eq!(json["toast"]["severity"], "destructive");
    }

    #[test]
    fn navigate_json_shape() {
        let json = serde_json::to_value(FlowEvent::Navigate { to: Page::ThankYou }).unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["to"], "/thank-you");
    }

    #[test]
    fn listening_toasts_differ() {
        assert_eq!(Toast::listening(true).title, "Started Listening");
        assert_eq!(Toast::listening(false).title, "Stopped Listening");
        assert_eq!(Toast::listening(false).severity, Severity::Normal);
    }

    #[test]
    fn validation_errors_map_to_destructive_toasts() {
        let missing = ValidationError::MissingFields {
            fields: vec!["email"],
        };
        assert_eq!(Toast::from(&missing).title, "Missing Information");
        let bad = ValidationError::InvalidEmail {
            email: "nope".into(),
        };
        assert_eq!(Toast::from(&bad), Toast::invalid_email());
        let short = ValidationError::TranscriptTooShort { len: 1, min: 3 };
        assert_eq!(Toast::from(&short).severity, Severity::Destructive);
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_ok() {
        let bus = EventBus::new();
        bus.toast(Toast::submitted());

        let mut rx = bus.subscribe();
        bus.toast(Toast::invalid_email());
        match rx.recv().await.unwrap() {
            FlowEvent::Toast { toast } => assert_eq!(toast.title, "Invalid Email"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
