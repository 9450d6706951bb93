//! The interview page and its submission pipeline.

pub mod report;
pub mod responder;
pub mod session;
pub mod timer;
pub mod transcript;

pub use report::{CompletionRecord, LoggingReportSink, ReportSink, WebhookReportSink};
pub use responder::{CANNED_REPLIES, CannedResponder, Responder};
pub use session::{InterviewDeps, InterviewPhase, InterviewSession, InterviewSnapshot, SendOutcome};
pub use timer::PendingTask;
pub use transcript::{Role, Transcript, TranscriptMessage};
