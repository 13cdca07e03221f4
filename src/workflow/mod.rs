pub mod types;
pub mod graph;

pub use types::*;
pub use graph::{outgoing, route, TRANSITIONS};
