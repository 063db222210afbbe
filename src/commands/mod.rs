pub mod kiosk;
pub mod utils;

pub use kiosk::{run_invoke, run_lock, run_status, run_unlock};
