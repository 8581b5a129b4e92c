//! Terminal front end

pub mod assets;
pub mod convert;
pub mod refresh;
pub mod setup;
pub mod ui;
pub mod watch;
