//! Request and response shapes for the extender protocol.
//!
//! One request/response pair per extension point, plus the shared workload
//! and node descriptors they embed. Maps keyed by node name use `BTreeMap`
//! so encodings are deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of a candidate node, as used in map keys and score entries.
pub type NodeName = String;

// ── Shared descriptors ─────────────────────────────────────────────

/// The schedulable entity the scheduler is trying to place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkloadUnit {
    pub name: String,
    pub namespace: String,
    pub uid: String,
}

/// A cluster node under consideration for placement.
///
/// Anything beyond the name is scheduler-defined detail; it is captured
/// verbatim so callers can inspect it without this crate tracking every
/// field the scheduler may add.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateNode {
    pub name: NodeName,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

// ── Filter ─────────────────────────────────────────────────────────

/// Asks the extension point to filter candidate nodes for a workload unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRequest {
    pub workload_unit: WorkloadUnit,
    pub nodes: Vec<CandidateNode>,
}

/// Partition of the request's nodes into admitted and rejected.
///
/// `nodes` lists admitted node names in request order; `failed_nodes` maps
/// each rejected node to a human-readable reason. `error` is the in-band
/// channel for decode and evaluation failures — the filter endpoint always
/// answers HTTP 200.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterResponse {
    pub nodes: Vec<NodeName>,
    pub failed_nodes: BTreeMap<NodeName, String>,
    pub error: String,
}

// ── Prioritize ─────────────────────────────────────────────────────

/// Asks the extension point to score candidate nodes for a workload unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityRequest {
    pub workload_unit: WorkloadUnit,
    pub nodes: Vec<CandidateNode>,
}

/// Desirability score for a single node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostPriority {
    pub host: NodeName,
    pub score: i64,
}

/// The prioritize response body: one entry per candidate node.
pub type HostPriorityList = Vec<HostPriority>;

// ── Bind ───────────────────────────────────────────────────────────

/// Asks the extension point to commit a workload unit to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BindRequest {
    pub pod_name: String,
    pub pod_namespace: String,
    #[serde(rename = "podUID")]
    pub pod_uid: String,
    pub node: NodeName,
}

/// Bind outcome; `error` is empty on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindResponse {
    pub error: String,
}

// ── Preemption ─────────────────────────────────────────────────────

/// Full victim detail for one candidate node: the workload units that would
/// be evicted to make room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Victims {
    pub units: Vec<WorkloadUnit>,
}

/// Reduced victim representation the scheduler round-trips back to the
/// extension point on a later call, identified by unit UID only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaVictims {
    pub uids: Vec<String>,
}

/// Asks the extension point to reconsider the scheduler's victim selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreemptionRequest {
    pub workload_unit: WorkloadUnit,
    pub node_name_to_victims: BTreeMap<NodeName, Victims>,
    pub node_name_to_meta_victims: BTreeMap<NodeName, MetaVictims>,
}

/// Updated victim selection. Keys must be a subset of the request's
/// meta-victims keys; that is a caller obligation, not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreemptionResponse {
    pub node_name_to_meta_victims: BTreeMap<NodeName, MetaVictims>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_decode_to_zero_values() {
        let req: FilterRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.workload_unit, WorkloadUnit::default());
        assert!(req.nodes.is_empty());

        let bind: BindRequest = serde_json::from_str(r#"{"podName":"web-0"}"#).unwrap();
        assert_eq!(bind.pod_name, "web-0");
        assert_eq!(bind.pod_uid, "");
        assert_eq!(bind.node, "");
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let body = r#"{
            "workloadUnit": {"name": "web-0", "namespace": "default", "uid": "u1", "priority": 7},
            "nodes": [{"name": "a", "zone": "us-east-1b"}],
            "futureField": true
        }"#;
        let req: FilterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.workload_unit.name, "web-0");
        assert_eq!(req.nodes[0].name, "a");
        // Node metadata beyond the name is kept verbatim.
        assert_eq!(req.nodes[0].metadata["zone"], "us-east-1b");
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(serde_json::from_str::<FilterRequest>("{nodes: [").is_err());
        assert!(serde_json::from_str::<PreemptionRequest>("not json").is_err());
    }

    #[test]
    fn bind_request_uses_the_protocol_uid_key() {
        let bind: BindRequest =
            serde_json::from_str(r#"{"podUID":"abc-123","node":"a"}"#).unwrap();
        assert_eq!(bind.pod_uid, "abc-123");

        let encoded = serde_json::to_value(&bind).unwrap();
        assert_eq!(encoded["podUID"], "abc-123");
        assert_eq!(encoded["podNamespace"], "");
    }

    #[test]
    fn filter_response_round_trips() {
        let resp = FilterResponse {
            nodes: vec!["a".into(), "c".into()],
            failed_nodes: BTreeMap::from([("b".to_string(), "no capacity".to_string())]),
            error: String::new(),
        };
        let encoded = serde_json::to_string(&resp).unwrap();
        let decoded: FilterResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, resp);

        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["failedNodes"]["b"], "no capacity");
    }

    #[test]
    fn preemption_shapes_round_trip() {
        let req = PreemptionRequest {
            workload_unit: WorkloadUnit {
                name: "web-0".into(),
                namespace: "default".into(),
                uid: "u1".into(),
            },
            node_name_to_victims: BTreeMap::from([(
                "a".to_string(),
                Victims {
                    units: vec![WorkloadUnit {
                        name: "batch-1".into(),
                        namespace: "jobs".into(),
                        uid: "u2".into(),
                    }],
                },
            )]),
            node_name_to_meta_victims: BTreeMap::from([(
                "a".to_string(),
                MetaVictims { uids: vec!["u2".into()] },
            )]),
        };
        let encoded = serde_json::to_string(&req).unwrap();
        let decoded: PreemptionRequest = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, req);

        let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["nodeNameToMetaVictims"]["a"]["uids"][0], "u2");
    }

    #[test]
    fn candidate_node_metadata_round_trips() {
        let body = r#"{"name":"a","labels":{"zone":"us-east-1b"},"capacity":{"cpu":16}}"#;
        let node: CandidateNode = serde_json::from_str(body).unwrap();
        let encoded = serde_json::to_string(&node).unwrap();
        let decoded: CandidateNode = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, node);
    }
}
