pub mod cancellation;
pub mod logger;

pub use cancellation::{ensure_active, run_cancellable, run_with_deadline};
pub use logger::{init_logger, LogContext, TimedOperation};
