pub mod aggregator;
pub mod handlers;
pub mod prompts;
pub mod ranking;
pub mod store;
pub mod technical;
