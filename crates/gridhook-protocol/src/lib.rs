//! gridhook-protocol — wire contract for scheduler extender callbacks.
//!
//! Structural mirror of the JSON bodies the cluster scheduler exchanges with
//! an out-of-process extension point: filter, prioritize, bind, and
//! preemption message families. These types carry no behavior beyond
//! (de)serialization.
//!
//! # Decoding rules
//!
//! - Keys are camelCase on the wire.
//! - Absent fields take their zero value (`#[serde(default)]` throughout).
//! - Unknown fields are tolerated, for forward compatibility with protocol
//!   extensions.
//! - Structurally invalid JSON is a decode error; how a decode error is
//!   surfaced is per-endpoint policy and lives in `gridhook-api`.

pub mod types;

pub use types::*;
