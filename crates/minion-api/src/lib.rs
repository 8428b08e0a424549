pub mod auth;
pub mod directory;
pub mod error;
pub mod messages;
pub mod routes;

pub use auth::{AppState, AppStateInner, MinionService};
pub use error::ApiError;
