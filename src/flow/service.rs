//! Page controllers for the flow.
//!
//! Each `enter_*` call decides whether the page renders or bounces the user
//! to an earlier page. Only one page is mounted at a time, so entering any
//! page other than the interview tears down the active interview session.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::page::{Page, PageOutcome};
use super::steps::{self, StepView};
use crate::error::{FlowError, Result};
use crate::events::{EventBus, Toast};
use crate::interview::session::{
    InterviewDeps, InterviewPhase, InterviewSession, InterviewSnapshot, SendOutcome,
};
use crate::interview::transcript::TranscriptMessage;
use crate::session::model::{ACADEMIC_YEARS, CatalogOption, DOMAINS, POSITIONS};
use crate::session::{SessionStore, SignupForm};

/// A headline plus one line of copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingView {
    pub brand: &'static str,
    pub headline: &'static str,
    pub tagline: &'static str,
    pub call_to_action: Page,
    pub features: [Feature; 3],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupView {
    pub progress: Vec<StepView>,
    pub years: &'static [CatalogOption],
    pub domains: &'static [CatalogOption],
    pub positions: &'static [CatalogOption],
}

/// Heading shown above the transcript.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewHeading {
    pub position: String,
    pub domains: String,
    pub year: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewView {
    pub session_id: Uuid,
    pub heading: InterviewHeading,
    /// Avatar letter for the user's chat bubbles.
    pub initial: Option<char>,
    pub phase: InterviewPhase,
    pub listening: bool,
    pub messages: Vec<TranscriptMessage>,
    pub progress: Vec<StepView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThankYouView {
    pub position: String,
    pub email: String,
    pub domains: String,
    pub next_steps: [Feature; 3],
    pub progress: Vec<StepView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundView {
    pub path: String,
    pub title: &'static str,
    pub message: &'static str,
    pub home: Page,
}

const LANDING_FEATURES: [Feature; 3] = [
    Feature {
        title: "AI-Powered Questions",
        description: "Smart questions tailored to your domain and experience level",
    },
    Feature {
        title: "Instant Feedback",
        description: "Real-time analysis of your answers with improvement suggestions",
    },
    Feature {
        title: "Detailed Reports",
        description: "Comprehensive analysis sent directly to your email",
    },
];

const NEXT_STEPS: [Feature; 3] = [
    Feature {
        title: "Detailed Analysis",
        description: "Comprehensive breakdown of your interview performance across all key areas",
    },
    Feature {
        title: "Improvement Tips",
        description: "Personalized suggestions to enhance your interview skills",
    },
    Feature {
        title: "Practice Resources",
        description: "Curated resources and questions for your next interview preparation",
    },
];

/// Owns the single logical tab: the session store and at most one live
/// interview session.
pub struct FlowService {
    deps: InterviewDeps,
    active: RwLock<Option<Arc<InterviewSession>>>,
}

impl FlowService {
    pub fn new(deps: InterviewDeps) -> Self {
        Self {
            deps,
            active: RwLock::new(None),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.deps.events
    }

    pub fn session(&self) -> &SessionStore {
        &self.deps.session
    }

    // ── Landing ─────────────────────────────────────────────────────────

    pub async fn landing(&self) -> LandingView {
        self.leave_interview().await;
        LandingView {
            brand: "MockMate AI",
            headline: "Crack your next interview with AI",
            tagline: "Personalized mock interviews, instant feedback, and detailed reports, all free.",
            call_to_action: Page::Signup,
            features: LANDING_FEATURES,
        }
    }

    // ── Signup ──────────────────────────────────────────────────────────

    pub async fn signup_options(&self) -> SignupView {
        self.leave_interview().await;
        SignupView {
            progress: progress_for(Page::Signup),
            years: ACADEMIC_YEARS,
            domains: DOMAINS,
            positions: POSITIONS,
        }
    }

    /// Validate and persist the form, then move on to the interview.
    ///
    /// A rejected form raises a destructive toast and leaves the store
    /// untouched.
    pub async fn submit_signup(&self, form: SignupForm) -> Result<Page> {
        let profile = match form.validate() {
            Ok(profile) => profile,
            Err(e) => {
                info!(error = %e, "Signup rejected");
                self.deps.events.toast(Toast::from(&e));
                return Err(e.into());
            }
        };

        self.deps.session.save(&profile).await?;
        tokio::time::sleep(self.deps.config.signup_delay).await;
        Ok(Page::Interview)
    }

    // ── Interview ───────────────────────────────────────────────────────

    /// Start a fresh interview for the stored profile, replacing any
    /// previous one.
    pub async fn enter_interview(&self) -> Result<PageOutcome<InterviewView>> {
        let Some(profile) = self.deps.session.load().await? else {
            info!("No profile stored, redirecting to signup");
            return Ok(PageOutcome::redirect(Page::Signup));
        };

        let interview = Arc::new(InterviewSession::start(profile, self.deps.clone()));
        let previous = self.active.write().await.replace(Arc::clone(&interview));
        if let Some(previous) = previous {
            previous.teardown();
        }

        Ok(PageOutcome::render(interview_view(&interview).await))
    }

    /// The mounted interview session.
    pub async fn active(&self) -> std::result::Result<Arc<InterviewSession>, FlowError> {
        self.active
            .read()
            .await
            .clone()
            .ok_or(FlowError::NoActiveInterview)
    }

    pub async fn interview_state(&self) -> std::result::Result<InterviewSnapshot, FlowError> {
        Ok(self.active().await?.snapshot().await)
    }

    pub async fn send_message(&self, text: &str) -> std::result::Result<SendOutcome, FlowError> {
        self.active().await?.send(text).await
    }

    pub async fn toggle_voice(&self) -> std::result::Result<bool, FlowError> {
        Ok(self.active().await?.toggle_voice().await)
    }

    pub async fn finish(&self) -> Result<()> {
        let interview = self.active().await?;
        interview.finish().await
    }

    /// Unmount the interview page. Returns whether a session was active.
    pub async fn leave_interview(&self) -> bool {
        let previous = self.active.write().await.take();
        match previous {
            Some(interview) => {
                info!(session_id = %interview.id(), "Leaving interview");
                interview.teardown();
                true
            }
            None => false,
        }
    }

    // ── Thank you ───────────────────────────────────────────────────────

    pub async fn enter_thank_you(&self) -> Result<PageOutcome<ThankYouView>> {
        self.leave_interview().await;

        if !self.deps.session.is_completed().await? {
            info!("Interview not completed, redirecting to landing");
            return Ok(PageOutcome::redirect(Page::Landing));
        }
        let Some(profile) = self.deps.session.load().await? else {
            warn!("Completion flag set without a profile, redirecting to landing");
            return Ok(PageOutcome::redirect(Page::Landing));
        };

        Ok(PageOutcome::render(ThankYouView {
            position: profile.position_label().to_string(),
            domains: profile.domains_label(),
            email: profile.email,
            next_steps: NEXT_STEPS,
            progress: progress_for(Page::ThankYou),
        }))
    }

    /// Forget everything and start over.
    pub async fn back_to_home(&self) -> Result<Page> {
        self.leave_interview().await;
        self.deps.session.clear().await?;
        info!("Session cleared, returning home");
        Ok(Page::Landing)
    }

    // ── Not found ───────────────────────────────────────────────────────

    pub async fn not_found(&self, path: &str) -> NotFoundView {
        error!(path, "404 Error: User attempted to access non-existent route");
        self.leave_interview().await;
        NotFoundView {
            path: path.to_string(),
            title: "Page Not Found",
            message: "Oops! The page you're looking for seems to have vanished into the digital void.",
            home: Page::Landing,
        }
    }
}

async fn interview_view(interview: &InterviewSession) -> InterviewView {
    let profile = interview.profile();
    let snapshot = interview.snapshot().await;
    InterviewView {
        session_id: snapshot.id,
        heading: InterviewHeading {
            position: profile.position_label().to_string(),
            domains: profile.domains_label(),
            year: profile.year_label().to_string(),
        },
        initial: profile.initial(),
        phase: snapshot.phase,
        listening: snapshot.listening,
        messages: snapshot.messages,
        progress: progress_for(Page::Interview),
    }
}

fn progress_for(page: Page) -> Vec<StepView> {
    page.progress_step().map(steps::progress).unwrap_or_default()
}
