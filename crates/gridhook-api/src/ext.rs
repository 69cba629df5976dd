//! Extension-point adapters.
//!
//! One single-method trait per extension-point kind, so decision logic can
//! be supplied as a closure, a fn pointer, or any object implementing the
//! trait. The adapter structs pair a decision function with its route name
//! and own the translation between wire types and domain calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use gridhook_protocol::{
    BindRequest, BindResponse, CandidateNode, FilterRequest, FilterResponse, HostPriorityList,
    MetaVictims, NodeName, PreemptionRequest, PreemptionResponse, PriorityRequest, Victims,
    WorkloadUnit,
};

use crate::error::ExtenderError;

/// Reason attached to nodes a predicate declines without an error.
pub const REJECT_REASON: &str = "node rejected by predicate";

// ── Decision-function traits ───────────────────────────────────────

/// Admits or rejects one candidate node for a workload unit.
pub trait PredicateFn: Send + Sync {
    fn admit(&self, unit: &WorkloadUnit, node: &CandidateNode) -> anyhow::Result<bool>;
}

impl<F> PredicateFn for F
where
    F: Fn(&WorkloadUnit, &CandidateNode) -> anyhow::Result<bool> + Send + Sync,
{
    fn admit(&self, unit: &WorkloadUnit, node: &CandidateNode) -> anyhow::Result<bool> {
        self(unit, node)
    }
}

/// Scores every candidate node for a workload unit.
///
/// A successful result must contain exactly one entry per input node.
pub trait PrioritizeFn: Send + Sync {
    fn score(&self, unit: &WorkloadUnit, nodes: &[CandidateNode]) -> anyhow::Result<HostPriorityList>;
}

impl<F> PrioritizeFn for F
where
    F: Fn(&WorkloadUnit, &[CandidateNode]) -> anyhow::Result<HostPriorityList> + Send + Sync,
{
    fn score(&self, unit: &WorkloadUnit, nodes: &[CandidateNode]) -> anyhow::Result<HostPriorityList> {
        self(unit, nodes)
    }
}

/// Commits a workload unit to a node.
pub trait BindFn: Send + Sync {
    fn bind(&self, name: &str, namespace: &str, uid: &str, node: &str) -> anyhow::Result<()>;
}

impl<F> BindFn for F
where
    F: Fn(&str, &str, &str, &str) -> anyhow::Result<()> + Send + Sync,
{
    fn bind(&self, name: &str, namespace: &str, uid: &str, node: &str) -> anyhow::Result<()> {
        self(name, namespace, uid, node)
    }
}

/// Reconsiders the scheduler's preemption victim selection.
///
/// The returned map's keys must be a subset of `meta_victims`' keys. The
/// dispatcher passes the result through without repair; violating this is a
/// caller bug, not a request error.
pub trait PreemptionFn: Send + Sync {
    fn preempt(
        &self,
        unit: &WorkloadUnit,
        victims: &BTreeMap<NodeName, Victims>,
        meta_victims: &BTreeMap<NodeName, MetaVictims>,
    ) -> BTreeMap<NodeName, MetaVictims>;
}

impl<F> PreemptionFn for F
where
    F: Fn(
            &WorkloadUnit,
            &BTreeMap<NodeName, Victims>,
            &BTreeMap<NodeName, MetaVictims>,
        ) -> BTreeMap<NodeName, MetaVictims>
        + Send
        + Sync,
{
    fn preempt(
        &self,
        unit: &WorkloadUnit,
        victims: &BTreeMap<NodeName, Victims>,
        meta_victims: &BTreeMap<NodeName, MetaVictims>,
    ) -> BTreeMap<NodeName, MetaVictims> {
        self(unit, victims, meta_victims)
    }
}

// ── Adapters ───────────────────────────────────────────────────────

/// A named filter extension point.
#[derive(Clone)]
pub struct Predicate {
    name: String,
    func: Arc<dyn PredicateFn>,
}

impl Predicate {
    pub fn new(name: impl Into<String>, func: impl PredicateFn + 'static) -> Self {
        Self { name: name.into(), func: Arc::new(func) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Partition the request's candidate nodes into admitted and rejected.
    ///
    /// Admitted names keep request order. An evaluation error stops the
    /// partition and is carried in the response's `error` field instead.
    pub fn filter(&self, args: &FilterRequest) -> FilterResponse {
        let mut admitted = Vec::with_capacity(args.nodes.len());
        let mut failed = BTreeMap::new();
        for node in &args.nodes {
            match self.func.admit(&args.workload_unit, node) {
                Ok(true) => admitted.push(node.name.clone()),
                Ok(false) => {
                    failed.insert(node.name.clone(), REJECT_REASON.to_string());
                }
                Err(err) => {
                    return FilterResponse {
                        nodes: Vec::new(),
                        failed_nodes: BTreeMap::new(),
                        error: ExtenderError::Eval(err).to_string(),
                    };
                }
            }
        }
        FilterResponse { nodes: admitted, failed_nodes: failed, error: String::new() }
    }
}

/// A named scoring extension point.
#[derive(Clone)]
pub struct Prioritize {
    name: String,
    func: Arc<dyn PrioritizeFn>,
}

impl Prioritize {
    pub fn new(name: impl Into<String>, func: impl PrioritizeFn + 'static) -> Self {
        Self { name: name.into(), func: Arc::new(func) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Score the request's candidate nodes.
    ///
    /// Any failure is fatal for the request: there are no partial score
    /// lists, and a count mismatch from the decision function is rejected.
    pub fn prioritize(&self, args: &PriorityRequest) -> Result<HostPriorityList, ExtenderError> {
        let list = self
            .func
            .score(&args.workload_unit, &args.nodes)
            .map_err(ExtenderError::Eval)?;
        if list.len() != args.nodes.len() {
            return Err(ExtenderError::Contract(format!(
                "expected {} scores, got {}",
                args.nodes.len(),
                list.len()
            )));
        }
        Ok(list)
    }
}

/// The bind extension point.
#[derive(Clone)]
pub struct Bind {
    func: Arc<dyn BindFn>,
}

impl Bind {
    pub fn new(func: impl BindFn + 'static) -> Self {
        Self { func: Arc::new(func) }
    }

    /// Run the bind decision; failures are carried in-band.
    pub fn bind(&self, args: &BindRequest) -> BindResponse {
        match self.func.bind(&args.pod_name, &args.pod_namespace, &args.pod_uid, &args.node) {
            Ok(()) => BindResponse { error: String::new() },
            Err(err) => BindResponse { error: ExtenderError::Eval(err).to_string() },
        }
    }
}

/// The preemption extension point.
#[derive(Clone)]
pub struct Preemption {
    func: Arc<dyn PreemptionFn>,
}

impl Preemption {
    pub fn new(func: impl PreemptionFn + 'static) -> Self {
        Self { func: Arc::new(func) }
    }

    /// Run the victim-selection decision. No error channel exists on this
    /// endpoint; the result map is returned as-is.
    pub fn preempt(&self, args: &PreemptionRequest) -> PreemptionResponse {
        let meta = self.func.preempt(
            &args.workload_unit,
            &args.node_name_to_victims,
            &args.node_name_to_meta_victims,
        );
        PreemptionResponse { node_name_to_meta_victims: meta }
    }
}
