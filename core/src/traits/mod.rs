pub mod executor;
pub mod hooks;
pub mod strategy;

pub use executor::*;
pub use hooks::*;
pub use strategy::*;
