//! Data models for warehouse result sets.

mod result_set;
mod value;

pub use result_set::{FrameError, ResultSet};
pub use value::Value;
