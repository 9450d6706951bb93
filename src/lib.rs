//! Mock interview flow: signup, a simulated interview and its hand-off.

pub mod config;
pub mod error;
pub mod events;
pub mod flow;
pub mod interview;
pub mod session;
pub mod store;
