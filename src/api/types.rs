//! Wire and domain types for the truss backend.
//!
//! Decoding is deliberately forgiving about geometry: nodes may arrive as
//! `[x, y]`, `[x, y, z]` or `{x, y, z}`, elements as `[start, end]` or
//! `{from, to}`. A `truss_data` payload that still cannot be decoded is
//! dropped (and logged) so the reply text survives.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Geometry
// ============================================================================

/// A node position. Missing z defaults to 0.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "NodeRepr")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NodeRepr {
    Tuple(Vec<f64>),
    Keyed {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl TryFrom<NodeRepr> for Point3 {
    type Error = String;

    fn try_from(repr: NodeRepr) -> Result<Self, Self::Error> {
        match repr {
            NodeRepr::Tuple(coords) => match coords.as_slice() {
                [x, y] => Ok(Point3::new(*x, *y, 0.0)),
                [x, y, z] => Ok(Point3::new(*x, *y, *z)),
                other => Err(format!("node needs 2 or 3 coordinates, got {}", other.len())),
            },
            NodeRepr::Keyed { x, y, z } => Ok(Point3::new(x, y, z)),
        }
    }
}

/// A member between two node positions. Indices are signed so that bad
/// references survive decoding; the plot builder skips them.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "ElementRepr")]
pub struct Element {
    pub start: i64,
    pub end: i64,
}

impl Element {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ElementRepr {
    Pair(Vec<i64>),
    Keyed { from: i64, to: i64 },
}

impl TryFrom<ElementRepr> for Element {
    type Error = String;

    fn try_from(repr: ElementRepr) -> Result<Self, Self::Error> {
        match repr {
            ElementRepr::Pair(pair) => match pair.as_slice() {
                [start, end] => Ok(Element::new(*start, *end)),
                other => Err(format!("element needs 2 node indices, got {}", other.len())),
            },
            ElementRepr::Keyed { from, to } => Ok(Element::new(from, to)),
        }
    }
}

/// Boundary condition at a node (informational only).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Support {
    pub node: i64,
    #[serde(rename = "type", default = "default_support_kind")]
    pub kind: String,
}

fn default_support_kind() -> String {
    "pin".to_string()
}

/// Point load at a node (informational only).
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Load {
    pub node: i64,
    #[serde(default)]
    pub fx: f64,
    #[serde(default)]
    pub fy: f64,
    #[serde(default)]
    pub fz: f64,
}

/// Ready-to-render structure returned by the backend.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TrussGeometry {
    #[serde(default)]
    pub nodes: Vec<Point3>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub span: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub supports: Vec<Support>,
    #[serde(default)]
    pub loads: Vec<Load>,
}

impl TrussGeometry {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Decode a raw `truss_data` value, discarding shapes we can't use.
pub fn decode_geometry(value: serde_json::Value) -> Option<TrussGeometry> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value::<TrussGeometry>(value) {
        Ok(geometry) => Some(geometry),
        Err(e) => {
            warn!("Discarding malformed truss_data: {}", e);
            None
        }
    }
}

fn lenient_geometry<'de, D>(deserializer: D) -> Result<Option<TrussGeometry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(decode_geometry))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

/// Accepts Python `isoformat()` output (naive, optional fraction) and RFC 3339.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Local).naive_local())
        })
}

// ============================================================================
// Conversation
// ============================================================================

/// One user message and the assistant's answer. Never mutated after creation.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub message: String,
    pub response: String,
    #[serde(default, deserialize_with = "lenient_geometry")]
    pub truss_data: Option<TrussGeometry>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl ConversationEntry {
    /// Build an entry from a sent message and its reply, stamped with local time.
    pub fn from_reply(message: String, reply: ChatReply) -> Self {
        Self {
            message,
            response: reply.response,
            truss_data: reply.truss_data,
            created_at: Some(Local::now().naive_local()),
        }
    }
}

/// Normalized answer to a sent message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub truss_data: Option<TrussGeometry>,
}

/// Body sent to the chat/parse endpoint. `user_id` only goes out for the chat variant.
#[derive(Serialize, Debug)]
pub(crate) struct SendBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    pub message: &'a str,
}

/// Error body for non-2xx answers.
#[derive(Deserialize, Debug, Default)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub detail: Option<String>,
}

/// The two reply shapes the backends produce.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum ReplyBody {
    Structured {
        structured: StructuredTruss,
    },
    Plain {
        response: String,
        #[serde(default, deserialize_with = "lenient_geometry")]
        truss_data: Option<TrussGeometry>,
    },
}

impl From<ReplyBody> for ChatReply {
    fn from(body: ReplyBody) -> Self {
        match body {
            ReplyBody::Structured { structured } => structured.into_reply(),
            ReplyBody::Plain {
                response,
                truss_data,
            } => ChatReply {
                response,
                truss_data,
            },
        }
    }
}

// ============================================================================
// Structured parse payload (id-keyed nodes and elements)
// ============================================================================

#[derive(Deserialize, Debug, Default)]
pub(crate) struct StructuredTruss {
    #[serde(default)]
    span: f64,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    material: Option<String>,
    #[serde(default)]
    nodes: Vec<StructuredNode>,
    #[serde(default)]
    elements: Vec<StructuredElement>,
    #[serde(default)]
    supports: Vec<Support>,
    #[serde(default)]
    loads: Vec<Load>,
}

#[derive(Deserialize, Debug)]
struct StructuredNode {
    id: i64,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    z: f64,
}

#[derive(Deserialize, Debug)]
struct StructuredElement {
    from: i64,
    to: i64,
}

impl StructuredTruss {
    /// Map node ids to positions and synthesize the reply text.
    /// Unknown ids become -1 so the plot builder skips them.
    fn into_reply(self) -> ChatReply {
        let index_of: HashMap<i64, i64> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i as i64))
            .collect();
        let lookup = |id: i64| index_of.get(&id).copied().unwrap_or(-1);

        let nodes: Vec<Point3> = self
            .nodes
            .iter()
            .map(|n| Point3::new(n.x, n.y, n.z))
            .collect();
        let elements: Vec<Element> = self
            .elements
            .iter()
            .map(|e| Element::new(lookup(e.from), lookup(e.to)))
            .collect();
        let supports = self
            .supports
            .into_iter()
            .map(|s| Support {
                node: lookup(s.node),
                kind: s.kind,
            })
            .collect();
        let loads = self
            .loads
            .into_iter()
            .map(|l| Load {
                node: lookup(l.node),
                ..l
            })
            .collect();

        let mut response = format!(
            "Parsed truss: span {} m, height {} m, {} nodes, {} elements",
            self.span,
            self.height,
            nodes.len(),
            elements.len()
        );
        if let Some(ref material) = self.material {
            response.push_str(&format!(", material {material}"));
        }

        ChatReply {
            response,
            truss_data: Some(TrussGeometry {
                nodes,
                elements,
                span: self.span,
                height: self.height,
                material: self.material,
                supports,
                loads,
            }),
        }
    }
}

// ============================================================================
// Health
// ============================================================================

fn reachable_by_default() -> bool {
    true
}

/// Result of `GET /api/health`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HealthStatus {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub ollama: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// False when the probe itself failed (no answer or unreadable answer).
    #[serde(skip_deserializing, default = "reachable_by_default")]
    pub backend_reachable: bool,
}

impl HealthStatus {
    /// Status used when the probe could not complete.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            ollama: false,
            error: Some(error.into()),
            backend_reachable: false,
        }
    }

    /// Status for a backend that answered with a body we could not read.
    pub fn unreadable(error: impl Into<String>) -> Self {
        Self {
            backend_reachable: true,
            ..Self::degraded(error)
        }
    }

    /// The model service is up and the backend can use it.
    pub fn is_ready(&self) -> bool {
        self.ollama
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_accepts_pairs_triples_and_objects() {
        let geometry: TrussGeometry = serde_json::from_value(json!({
            "nodes": [[0, 0], [3, 0, 1], {"x": 1.5, "y": 2}],
            "elements": [[0, 1], {"from": 1, "to": 2}],
            "span": 3,
            "height": 2
        }))
        .unwrap();

        assert_eq!(geometry.nodes[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(geometry.nodes[1], Point3::new(3.0, 0.0, 1.0));
        assert_eq!(geometry.nodes[2], Point3::new(1.5, 2.0, 0.0));
        assert_eq!(geometry.elements, vec![Element::new(0, 1), Element::new(1, 2)]);
        assert_eq!(geometry.span, 3.0);
    }

    #[test]
    fn test_node_with_one_coordinate_is_rejected() {
        let result = serde_json::from_value::<TrussGeometry>(json!({"nodes": [[1]]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_element_index_survives_decoding() {
        let geometry: TrussGeometry =
            serde_json::from_value(json!({"nodes": [[0, 0]], "elements": [[0, -1]]})).unwrap();
        assert_eq!(geometry.elements[0], Element::new(0, -1));
    }

    #[test]
    fn test_malformed_truss_data_keeps_reply_text() {
        let body: ReplyBody = serde_json::from_value(json!({
            "response": "here you go",
            "truss_data": {"nodes": "not a list"}
        }))
        .unwrap();
        let reply = ChatReply::from(body);
        assert_eq!(reply.response, "here you go");
        assert!(reply.truss_data.is_none());
    }

    #[test]
    fn test_plain_reply_without_geometry() {
        let body: ReplyBody = serde_json::from_value(json!({"response": "hello"})).unwrap();
        let reply = ChatReply::from(body);
        assert_eq!(reply.response, "hello");
        assert!(reply.truss_data.is_none());
    }

    #[test]
    fn test_structured_reply_maps_ids_to_positions() {
        let body: ReplyBody = serde_json::from_value(json!({
            "structured": {
                "type": "truss",
                "span": 6.0,
                "height": 2.0,
                "material": "steel",
                "nodes": [
                    {"id": 10, "x": 0, "y": 0, "z": 0},
                    {"id": 20, "x": 6, "y": 0, "z": 0},
                    {"id": 30, "x": 3, "y": 2, "z": 0}
                ],
                "elements": [
                    {"id": 1, "from": 10, "to": 20},
                    {"id": 2, "from": 20, "to": 30},
                    {"id": 3, "from": 30, "to": 99}
                ],
                "supports": [{"node": 10, "type": "pin"}],
                "loads": [{"node": 30, "fx": 0, "fy": -10, "fz": 0}]
            }
        }))
        .unwrap();

        let reply = ChatReply::from(body);
        let geometry = reply.truss_data.unwrap();
        assert_eq!(
            geometry.elements,
            vec![Element::new(0, 1), Element::new(1, 2), Element::new(2, -1)]
        );
        assert_eq!(geometry.supports[0].node, 0);
        assert_eq!(geometry.loads[0].node, 2);
        assert_eq!(geometry.loads[0].fy, -10.0);
        assert_eq!(geometry.material.as_deref(), Some("steel"));
        assert_eq!(
            reply.response,
            "Parsed truss: span 6 m, height 2 m, 3 nodes, 3 elements, material steel"
        );
    }

    #[test]
    fn test_history_entry_parses_python_timestamp() {
        let entry: ConversationEntry = serde_json::from_value(json!({
            "message": "18m span",
            "response": "ok",
            "truss_data": null,
            "created_at": "2024-05-01T09:30:15.123456"
        }))
        .unwrap();
        let ts = entry.created_at.unwrap();
        assert_eq!(ts.format("%H:%M").to_string(), "09:30");
        assert!(entry.truss_data.is_none());
    }

    #[test]
    fn test_history_entry_with_garbage_timestamp() {
        let entry: ConversationEntry = serde_json::from_value(json!({
            "message": "m",
            "response": "r",
            "created_at": "yesterday"
        }))
        .unwrap();
        assert!(entry.created_at.is_none());
    }

    #[test]
    fn test_health_status_from_body_is_reachable() {
        let status: HealthStatus =
            serde_json::from_value(json!({"ok": false, "ollama": false})).unwrap();
        assert!(status.backend_reachable);
        assert!(!status.is_ready());
    }

    #[test]
    fn test_health_status_ready_follows_ollama_flag() {
        let status: HealthStatus = serde_json::from_value(json!({"ollama": true})).unwrap();
        assert!(status.is_ready());
    }

    #[test]
    fn test_degraded_health_status() {
        let status = HealthStatus::degraded("connection refused");
        assert!(!status.ok);
        assert!(!status.ollama);
        assert!(!status.backend_reachable);
        assert_eq!(status.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_unreadable_health_status_is_reachable() {
        let status = HealthStatus::unreadable("expected value");
        assert!(status.backend_reachable);
        assert!(!status.is_ready());
        assert_eq!(status.error.as_deref(), Some("expected value"));
    }

    #[test]
    fn test_send_body_omits_user_id_when_absent() {
        let body = SendBody {
            user_id: None,
            message: "hi",
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"message": "hi"}));
    }
}
