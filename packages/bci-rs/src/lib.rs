pub mod config;
pub mod control;
pub mod error;
pub mod plugin;
pub mod render;
pub mod stream;
pub mod types;

pub use config::{Backend, ControlConfig, DrainPolicy};
pub use error::{BciError, Result};
pub use stream::locator::{locate, locate_by, StreamPredicate};
pub use stream::{Inlet, Outlet, OutletFactory, StreamResolver};
pub use types::*;
