pub mod ticket;
pub mod profile;
pub mod config;
pub mod desk;

pub use ticket::*;
pub use profile::*;
pub use config::*;
pub use desk::*;
