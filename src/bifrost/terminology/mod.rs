pub mod config;
pub mod enrich;
pub mod error;
pub mod io;
pub mod layout;
pub mod model;
pub mod pipeline;

pub use error::{Result, ToolError};
