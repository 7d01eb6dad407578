pub mod app;
pub mod hack;
pub mod utility;

pub use self::app::{AppState, Hack};
