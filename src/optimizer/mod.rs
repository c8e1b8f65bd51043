//! Pass orchestration: the manager, the pass trait, and built-in passes.
//!
//! This module is the execution layer of the optimizer:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Optimization Pipeline                       │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  PassManager                Sequential, verified execution       │
//! │    ├─ collect interactions   (every pass, before any run)        │
//! │    ├─ verify schedule        (pure; abort with diagnosis)        │
//! │    ├─ run passes in order    (established set stepped between)   │
//! │    └─ cancel hook            (checked between passes)            │
//! │                                                                  │
//! │  Pass trait                 Interface for all passes             │
//! │    ├─ interactions()         Property declarations               │
//! │    └─ run()                  Transformation over the store       │
//! │                                                                  │
//! │  PassContext                Per-pass shared state                │
//! │    ├─ events                 Thread-safe change log              │
//! │    ├─ established()          Property snapshot on entry          │
//! │    └─ is_cancelled()         Best-effort cancellation            │
//! │                                                                  │
//! │  Passes                                                          │
//! │    └─ DedupBlocksPass        CFG block deduplication             │
//! │                                                                  │
//! │  EventLog                   Change tracking and diagnostics      │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pass-level execution is strictly sequential — the property-state
//! transition between passes would otherwise be undefined. Within a pass,
//! methods are processed in parallel; each worker mutates only its own
//! method's IR and reads shared tables immutably.

mod events;
mod manager;
mod pass;
mod passes;

pub use events::{Event, EventBuilder, EventKind, EventLog};
pub use manager::{PassManager, PassMetrics};
pub use pass::{Pass, PassContext};
pub use passes::DedupBlocksPass;
