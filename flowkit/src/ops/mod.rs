pub mod flowkit_order;
pub mod flowkit_resolve;
mod resolver_util;
