// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod clock;
pub mod config;
pub mod library;
pub mod pattern;
pub mod runtime;
pub mod scheduler;
pub mod timer;
pub mod util;
