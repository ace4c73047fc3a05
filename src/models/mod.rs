pub mod envelope;
pub mod record;
pub mod stats;
pub mod window;

pub use envelope::*;
pub use record::*;
pub use stats::*;
pub use window::*;
