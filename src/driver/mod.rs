//! Session hosting: frame loop and registry

pub mod registry;
pub mod runner;

pub use registry::SessionRegistry;
pub use runner::{FrameUpdate, SessionCommand, SessionDriver, SessionHandle};
