pub mod null;
pub mod process;

pub use null::NullExecutorPlugin;
pub use process::ProcessExecutorPlugin;
