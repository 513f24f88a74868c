//! Client side of Taskboard: typed wrappers around the task API and the
//! state a user interface keeps between requests.
pub mod api;
pub mod board;
pub mod cache;
pub mod config;
pub mod debounce;

pub use api::{ClientError, HttpTaskApi, TaskApi};
pub use board::{Confirmation, ListView, Notice, NoticeKind, TaskBoard};
pub use cache::{CacheKey, TaskCache};
pub use config::ClientConfig;
pub use debounce::SearchDebouncer;
