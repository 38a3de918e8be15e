mod entitlement;
mod order;
mod order_event;

pub use entitlement::*;
pub use order::*;
pub use order_event::*;
