//! # Events Module
//!
//! Event-driven architecture for GUI-ready progress reporting.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let hub = ProgressHub::new();
//! let receiver = hub.subscribe();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::ScanProgress(p) => println!("{}: {}/{}", p.phase, p.current, p.total),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! orchestrator.run_with_events(hub)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender, ProgressHub};
pub use types::*;
