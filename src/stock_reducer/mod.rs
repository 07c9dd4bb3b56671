//! The order stock reducer: validates every item of an order against current
//! stock and decrements all of them in one unit of work, or none at all.

mod error;
mod reducer;
mod store;

pub use error::*;
pub use reducer::*;
pub use store::*;
