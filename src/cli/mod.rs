mod app;
mod shell;

pub use app::*;
pub use shell::*;
