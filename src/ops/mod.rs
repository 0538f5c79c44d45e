pub mod attachment;
pub mod filter;
pub mod sample;
pub mod store;
