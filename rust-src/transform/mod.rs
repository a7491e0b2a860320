//! Pure transforms over cached result sets.
//!
//! Every operation borrows its input and returns a new result set.

mod aggregate;
mod filter;
mod pivot;

#[allow(unused_imports)]
pub use filter::Order;
