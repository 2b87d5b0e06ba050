//! Document state and its serialised write path.

mod session;
mod state;

pub use session::Session;
pub use state::{HostError, VisualisationHost};
