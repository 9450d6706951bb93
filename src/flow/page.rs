//! Navigation targets and the render-or-redirect outcome of entering a page.

use serde::{Serialize, Serializer};

/// The pages of the flow, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Landing,
    Signup,
    Interview,
    ThankYou,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Signup => "/signup",
            Self::Interview => "/interview",
            Self::ThankYou => "/thank-you",
        }
    }

    /// Ordinal shown in the progress tracker, if the page shows one.
    pub fn progress_step(&self) -> Option<u8> {
        match self {
            Self::Signup => Some(1),
            Self::Interview => Some(2),
            Self::ThankYou => Some(4),
            Self::Landing => None,
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl Serialize for Page {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

/// Result of entering a page: show it, or bounce to an earlier one.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome<T> {
    Render { view: T },
    Redirect { to: Page },
}

impl<T> PageOutcome<T> {
    pub fn render(view: T) -> Self {
        Self::Render { view }
    }

    pub fn redirect(to: Page) -> Self {
        Self::Redirect { to }
    }

    pub fn redirect_target(&self) -> Option<Page> {
        match self {
            Self::Redirect { to } => Some(*to),
            Self::Render { .. } => None,
        }
    }

    pub fn into_view(self) -> Option<T> {
        match self {
            Self::Render { view } => Some(view),
            Self::Redirect { .. } => None,
        }
    }
}
