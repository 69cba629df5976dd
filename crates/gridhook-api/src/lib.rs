//! gridhook-api — the extension-point surface of the extender.
//!
//! Decision functions supplied by the operator are registered into a
//! [`RouteTable`] during single-threaded bootstrap; the table is then
//! consumed into an axum router and stays read-only for the life of the
//! process. Each route decodes the scheduler's wire request, invokes the
//! bound decision function with domain-level arguments, and re-encodes the
//! result in the shape the scheduler expects.
//!
//! # Callback routes
//!
//! | Method | Path | Request | Response |
//! |---|---|---|---|
//! | GET | `/version` | none | build identifier (bare string) |
//! | POST | `/scheduler/predicates/{name}` | `FilterRequest` | `FilterResponse` — HTTP 200 always, errors in-band |
//! | POST | `/scheduler/priorities/{name}` | `PriorityRequest` | `HostPriorityList` — aborts with 500 on failure |
//! | POST | `/scheduler/bind` | `BindRequest` | `BindResponse` — HTTP 200 always, errors in-band |
//! | POST | `/scheduler/preemption` | `PreemptionRequest` | `PreemptionResponse` — 400 on decode failure |
//!
//! The asymmetric error shapes are what the consuming scheduler expects;
//! they are part of the contract, not candidates for unification.
//!
//! # Operator obligations
//!
//! Decision functions run concurrently without bound: they must be
//! re-entrant and free of hidden shared mutable state. The preemption
//! function must return only node names it was given. Neither obligation
//! can be enforced here.

pub mod error;
pub mod ext;
pub mod routes;

mod logging;

pub use error::ExtenderError;
pub use ext::{Bind, BindFn, Predicate, PredicateFn, Preemption, PreemptionFn, Prioritize, PrioritizeFn};
pub use routes::{BUILD_VERSION, Reply, Route, RouteTable};
