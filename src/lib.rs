// Library surface for the binary, headless integration tests and reuse.
pub mod analysis;
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod feedback;
pub mod logging;
pub mod metrics;
pub mod particles;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;
