//! Core domain types shared by the Taskboard server and client.
pub mod status;

#[cfg(feature = "serde")]
pub mod api;

pub use status::{StatusError, TaskAction, TaskStatus};
