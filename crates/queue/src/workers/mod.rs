//! Queue workers.

#![allow(missing_docs)]

mod fan_out;

pub use fan_out::{FanOutContext, fan_out_worker};
