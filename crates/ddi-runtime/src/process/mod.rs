//! Child process lifecycle helpers.

pub mod interrupt;
pub mod shutdown;

pub use interrupt::cancel_on_ctrl_c;
pub use shutdown::{SHUTDOWN_GRACE, shutdown_child};
