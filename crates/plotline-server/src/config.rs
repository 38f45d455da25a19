/// Re-export `Config` from `plotline-core` for use within this crate.
///
/// All environment-variable parsing lives in `plotline-core` so it can be
/// shared with integration tests and future crates without depending on the
/// full server.
pub use plotline_core::config::Config;
