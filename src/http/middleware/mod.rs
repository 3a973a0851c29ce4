pub mod metrics;
pub mod timeout;
