pub mod client;
pub mod worker;

pub use client::CoordinatorClient;
pub use worker::{Worker, WAIT_INTERVAL};
