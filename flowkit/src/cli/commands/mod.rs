pub mod order;
pub mod resolve;
