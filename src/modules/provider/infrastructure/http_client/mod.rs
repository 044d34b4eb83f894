mod rate_limit_client;
mod retry_policy;

pub use rate_limit_client::{status_error, RateLimitClient};
pub use retry_policy::{RateLimitInfo, RetryPolicy};
