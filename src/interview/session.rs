//! Interview session: the transcript state machine behind the interview page.
//!
//! ```text
//! Idle ──send──▶ Waiting ──reply delay──▶ Idle
//! Idle ──finish──▶ Submitting ──ok──▶ Completed
//!                       └──────error──▶ Idle
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::report::{CompletionRecord, ReportSink};
use super::responder::{Responder, welcome_message};
use super::timer::PendingTask;
use super::transcript::{Role, Transcript, TranscriptMessage};
use crate::config::FlowConfig;
use crate::error::{Error, FlowError, SubmissionError, ValidationError};
use crate::events::{EventBus, FlowEvent, Toast};
use crate::flow::page::Page;
use crate::session::{SessionStore, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    /// Accepting input.
    Idle,
    /// A reply is pending.
    Waiting,
    /// The completion record is being handed off.
    Submitting,
    /// Submitted; the page is about to leave.
    Completed,
}

impl std::fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Submitting => "submitting",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Result of a send attempt that was not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The user's message was appended and a reply is pending.
    Sent(TranscriptMessage),
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewSnapshot {
    pub id: Uuid,
    pub phase: InterviewPhase,
    pub listening: bool,
    pub messages: Vec<TranscriptMessage>,
}

/// Collaborators shared by every interview session.
#[derive(Clone)]
pub struct InterviewDeps {
    pub responder: Arc<dyn Responder>,
    pub reports: Arc<dyn ReportSink>,
    pub session: SessionStore,
    pub events: EventBus,
    pub config: FlowConfig,
}

struct State {
    phase: InterviewPhase,
    transcript: Transcript,
    listening: bool,
}

/// One visit to the interview page. Dropping it cancels any pending work.
pub struct InterviewSession {
    id: Uuid,
    profile: Arc<UserProfile>,
    state: Arc<Mutex<State>>,
    deps: InterviewDeps,
    pending: std::sync::Mutex<Option<PendingTask>>,
}

impl InterviewSession {
    /// Open a session whose transcript starts with the welcome message.
    pub fn start(profile: UserProfile, deps: InterviewDeps) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Role::Assistant, welcome_message(&profile));

        let id = Uuid::new_v4();
        info!(session_id = %id, name = %profile.full_name, "Interview started");

        Self {
            id,
            profile: Arc::new(profile),
            state: Arc::new(Mutex::new(State {
                phase: InterviewPhase::Idle,
                transcript,
                listening: false,
            })),
            deps,
            pending: std::sync::Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub async fn phase(&self) -> InterviewPhase {
        self.state.lock().await.phase
    }

    pub async fn snapshot(&self) -> InterviewSnapshot {
        let state = self.state.lock().await;
        InterviewSnapshot {
            id: self.id,
            phase: state.phase,
            listening: state.listening,
            messages: state.transcript.messages().to_vec(),
        }
    }

    /// Submit user text. Blank input is ignored without changing state.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, FlowError> {
        let text = text.trim();
        if text.is_empty() {
            debug!(session_id = %self.id, "Ignoring blank input");
            return Ok(SendOutcome::Ignored);
        }

        let message = {
            let mut state = self.state.lock().await;
            ensure_idle(state.phase)?;
            let message = state.transcript.push(Role::User, text);
            state.phase = InterviewPhase::Waiting;
            message
        };

        let events = &self.deps.events;
        events.emit(FlowEvent::MessageAppended {
            message: message.clone(),
        });
        events.emit(FlowEvent::PhaseChanged {
            phase: InterviewPhase::Waiting,
        });

        let task = PendingTask::after(self.deps.config.reply_delay, self.reply_work());
        self.set_pending(task);
        Ok(SendOutcome::Sent(message))
    }

    fn reply_work(&self) -> impl Future<Output = ()> + Send + 'static {
        let state = Arc::clone(&self.state);
        let profile = Arc::clone(&self.profile);
        let responder = Arc::clone(&self.deps.responder);
        let events = self.deps.events.clone();
        let session_id = self.id;

        async move {
            let history = state.lock().await.transcript.messages().to_vec();
            let reply = responder.reply(&profile, &history).await;

            let message = {
                let mut state = state.lock().await;
                let message = state.transcript.push(Role::Assistant, reply);
                state.phase = InterviewPhase::Idle;
                message
            };
            debug!(session_id = %session_id, message_id = message.id, "Interviewer replied");

            events.emit(FlowEvent::MessageAppended { message });
            events.emit(FlowEvent::PhaseChanged {
                phase: InterviewPhase::Idle,
            });
        }
    }

    /// Flip the voice-input flag. Returns the new value.
    pub async fn toggle_voice(&self) -> bool {
        let listening = {
            let mut state = self.state.lock().await;
            state.listening = !state.listening;
            state.listening
        };
        debug!(session_id = %self.id, listening, "Voice input toggled");
        self.deps.events.toast(Toast::listening(listening));
        listening
    }

    /// Start submitting the interview.
    ///
    /// Returns once the submission is under way; its outcome arrives as
    /// events (a toast, then a phase change or a navigation).
    pub async fn finish(&self) -> Result<(), Error> {
        let record = {
            let mut state = self.state.lock().await;
            ensure_idle(state.phase)?;

            let len = state.transcript.len();
            if let Some(min) = self.deps.config.min_transcript_len {
                if len < min {
                    drop(state);
                    info!(session_id = %self.id, len, min, "Interview too short to submit");
                    self.deps.events.toast(Toast::interview_too_short());
                    return Err(ValidationError::TranscriptTooShort { len, min }.into());
                }
            }

            state.phase = InterviewPhase::Submitting;
            CompletionRecord::new(
                self.profile.as_ref().clone(),
                state.transcript.messages().to_vec(),
            )
        };

        info!(
            session_id = %self.id,
            conversation_length = record.conversation_length,
            "Submitting interview"
        );
        self.deps.events.emit(FlowEvent::PhaseChanged {
            phase: InterviewPhase::Submitting,
        });

        let task = PendingTask::spawn(self.submit_work(record));
        self.set_pending(task);
        Ok(())
    }

    fn submit_work(&self, record: CompletionRecord) -> impl Future<Output = ()> + Send + 'static {
        let state = Arc::clone(&self.state);
        let deps = self.deps.clone();
        let session_id = self.id;

        async move {
            let delivered = async {
                deps.reports.submit(&record).await?;
                tokio::time::sleep(deps.config.submit_delay).await;
                deps.session.mark_completed().await?;
                Ok::<(), SubmissionError>(())
            }
            .await;

            match delivered {
                Ok(()) => {
                    info!(session_id = %session_id, "Interview submitted");
                    deps.events.toast(Toast::submitted());
                    tokio::time::sleep(deps.config.redirect_delay).await;
                    state.lock().await.phase = InterviewPhase::Completed;
                    deps.events.emit(FlowEvent::PhaseChanged {
                        phase: InterviewPhase::Completed,
                    });
                    deps.events.emit(FlowEvent::Navigate { to: Page::ThankYou });
                }
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Interview submission failed");
                    deps.events.toast(Toast::submission_failed());
                    state.lock().await.phase = InterviewPhase::Idle;
                    deps.events.emit(FlowEvent::PhaseChanged {
                        phase: InterviewPhase::Idle,
                    });
                }
            }
        }
    }

    /// Wait until any pending reply or submission has run its course.
    pub async fn settle(&self) {
        let task = self.take_pending();
        if let Some(task) = task {
            task.join().await;
        }
    }

    /// Cancel pending work. The transcript is discarded with the session.
    pub fn teardown(&self) {
        if let Some(task) = self.take_pending() {
            if task.is_pending() {
                info!(session_id = %self.id, "Cancelling pending interview work");
            }
            task.cancel();
        }
    }

    fn set_pending(&self, task: PendingTask) {
        let mut slot = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(task);
    }

    fn take_pending(&self) -> Option<PendingTask> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

fn ensure_idle(phase: InterviewPhase) -> Result<(), FlowError> {
    match phase {
        InterviewPhase::Idle => Ok(()),
        InterviewPhase::Completed => Err(FlowError::AlreadySubmitted),
        other => Err(FlowError::Busy {
            phase: other.to_string(),
        }),
    }
}
