pub mod scoring;
pub mod store;
