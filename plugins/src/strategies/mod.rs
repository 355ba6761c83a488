pub mod progressive;
pub mod systematic;

pub use progressive::{Phase, ProgressiveStrategy};
pub use systematic::SystematicStrategy;
