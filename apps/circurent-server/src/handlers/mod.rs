//! HTTP request handlers.

mod register;
mod verification;

pub use register::register;
pub use verification::{check_email, check_username, send_verification, verify_email};
