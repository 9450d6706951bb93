//! Page flow: navigation, progress tracker, page controllers and the HTTP
//! surface over them.

pub mod page;
pub mod routes;
pub mod service;
pub mod steps;
pub mod ws;

pub use page::{Page, PageOutcome};
pub use routes::{AppState, flow_routes};
pub use service::FlowService;
