//! Session state shared across pages: the signup profile and the
//! interview completion flag.

pub mod migration;
pub mod model;
pub mod store;

pub use migration::migrate_profile;
pub use model::{SignupForm, UserProfile};
pub use store::SessionStore;
