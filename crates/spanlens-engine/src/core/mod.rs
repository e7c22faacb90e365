//! Contract between the runtime loop and the application drawing into it.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
