pub mod config;
pub mod field;
pub mod rule;
pub mod state;

pub use config::*;
pub use field::*;
pub use rule::*;
pub use state::*;
