//! Typed clients wrapping the generic resource client.

mod product_client;

pub use product_client::*;
