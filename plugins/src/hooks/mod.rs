pub mod logging;

pub use logging::TracingHookPlugin;
