//! Host-facing runtime layer for tcscl.
//!
//! Everything here happens strictly before or after a run:
//!
//! - **Preload**: parse the preload source and fill lists from the
//!   assembler's side table
//! - **Sink**: serialize drained output entries as text or JSON Lines

pub mod preload;
pub mod sink;

// Re-export from preload
pub use preload::{resolve, PreloadSource, PreloadSummary};

// Re-export from sink
pub use sink::{format_line, format_value, to_json, ResultSink, SinkFormat};
