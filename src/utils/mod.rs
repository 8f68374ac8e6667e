pub mod retry;

pub use retry::with_backoff;
