mod metrics;
mod readback;

pub use self::metrics::*;
pub use self::readback::*;
