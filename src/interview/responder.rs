//! Simulated interviewer that picks the next question from a canned list.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::transcript::TranscriptMessage;
use crate::session::UserProfile;

/// The interviewer's fixed follow-up questions.
pub const CANNED_REPLIES: [&str; 6] = [
    "That's a great answer! Can you tell me about a challenging project you've worked on?",
    "Interesting perspective! How do you handle debugging complex issues in your code?",
    "Good point! What's your experience with version control systems like Git?",
    "I see. Can you explain the difference between SQL and NoSQL databases?",
    "Excellent! How would you optimize a slow-running query?",
    "Thank you for sharing that. Let's wrap up - do you have any questions for me?",
];

/// Produces the assistant's next message.
///
/// A real interviewer backend would implement this; the session only
/// depends on the trait.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, profile: &UserProfile, transcript: &[TranscriptMessage]) -> String;
}

/// Uniform random pick from [`CANNED_REPLIES`].
pub struct CannedResponder {
    rng: Mutex<StdRng>,
}

impl CannedResponder {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic sequence, for tests and reproducible demos.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn pick(&self) -> &'static str {
        let index = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..CANNED_REPLIES.len()),
            Err(poisoned) => poisoned.into_inner().gen_range(0..CANNED_REPLIES.len()),
        };
        CANNED_REPLIES[index]
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Responder for CannedResponder {
    async fn reply(&self, _profile: &UserProfile, _transcript: &[TranscriptMessage]) -> String {
        self.pick().to_string()
    }
}

/// Opening message of every interview, personalised from the profile.
pub fn welcome_message(profile: &UserProfile) -> String {
    format!(
        "Welcome, {}! I'm excited to conduct your mock interview for the {} position. \
         I'll be asking you questions related to {} based on your {} level experience. \
         Let's start with: Tell me about yourself and why you're interested in this position.",
        profile.full_name,
        profile.position,
        profile.domains.join(", "),
        profile.year,
    )
}
