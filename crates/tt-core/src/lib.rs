//! topic-thumb/crates/tt-core/src/lib.rs
//!
//! Keeps a forum thread's preview thumbnail pointed at the latest image
//! its starter posted. Domain models, ports, and the decision logic.

pub mod assigner;
pub mod eligibility;
pub mod error;
pub mod hooks;
pub mod models;
pub mod settings;
pub mod traits;

// Re-exporting for easier access in other crates
pub use assigner::{Outcome, ThumbnailAssigner};
pub use eligibility::{Eligible, Ineligible};
pub use error::*;
pub use hooks::{HandlerReport, HookRegistry, ThumbnailHook};
pub use models::*;
pub use settings::ThumbnailSettings;
pub use traits::*;
