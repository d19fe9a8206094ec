pub mod carpool;
pub mod hosting;
pub mod membership;
pub mod security;
pub mod subscriptions;

pub use security::*;
