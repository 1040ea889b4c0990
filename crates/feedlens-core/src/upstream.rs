//! Schema of the upstream `web_profile_info` payload.
//!
//! Only the fields the normalizer reads are modeled. Every field is optional
//! and deserialized through [`crate::coerce`], so deserializing a user object
//! never fails on unexpected types.

use serde::Deserialize;
use serde_json::Value;

use crate::coerce;

/// Locate the user object in a decoded upstream response (`data.user`).
///
/// Returns `None` when the path is missing or the user is falsy
/// (`null`, `false`, `0`, `""`), which the handler reports as not found.
pub fn extract_user(body: &Value) -> Option<&Value> {
    body.get("data")
        .and_then(|data| data.get("user"))
        .filter(|user| coerce::is_truthy(user))
}

/// A profile as returned by the upstream API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamUser {
    #[serde(default, deserialize_with = "coerce::string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "coerce::string")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "coerce::truthy")]
    pub is_private: bool,

    #[serde(default, deserialize_with = "coerce::truthy")]
    pub is_verified: bool,

    #[serde(default, deserialize_with = "coerce::string")]
    pub biography: Option<String>,

    /// High-resolution avatar; preferred over `profile_pic_url`.
    #[serde(default, deserialize_with = "coerce::string")]
    pub profile_pic_url_hd: Option<String>,

    #[serde(default, deserialize_with = "coerce::string")]
    pub profile_pic_url: Option<String>,

    /// Follower count.
    #[serde(default, deserialize_with = "coerce::lenient")]
    pub edge_followed_by: Option<EdgeCount>,

    /// Following count.
    #[serde(default, deserialize_with = "coerce::lenient")]
    pub edge_follow: Option<EdgeCount>,

    /// Total post count plus the most recent page of posts.
    #[serde(default, deserialize_with = "coerce::lenient")]
    pub edge_owner_to_timeline_media: Option<TimelineMedia>,
}

impl UpstreamUser {
    /// Build from an arbitrary JSON value. Non-object input yields a user
    /// with every field absent.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Timeline nodes in upstream order, skipping wrappers without a node.
    pub fn timeline_nodes(&self) -> impl Iterator<Item = &TimelineNode> {
        self.edge_owner_to_timeline_media
            .iter()
            .flat_map(|media| media.edges.iter())
            .filter_map(|edge| edge.node.as_ref())
    }
}

/// The `{ "count": N }` wrapper used for every aggregate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeCount {
    #[serde(default, deserialize_with = "coerce::number")]
    pub count: Option<f64>,
}

impl EdgeCount {
    /// Read the count through an optional wrapper.
    pub fn of(edge: &Option<EdgeCount>) -> Option<f64> {
        edge.as_ref().and_then(|e| e.count)
    }
}

/// A list of `{ "node": T }` wrappers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct EdgeList<T> {
    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub edges: Vec<Edge<T>>,
}

/// One `{ "node": T }` wrapper. A missing or non-object node is `None`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct Edge<T> {
    #[serde(default, deserialize_with = "coerce::lenient")]
    pub node: Option<T>,
}

impl<T> Default for Edge<T> {
    fn default() -> Self {
        Self { node: None }
    }
}

/// `edge_owner_to_timeline_media`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineMedia {
    #[serde(default, deserialize_with = "coerce::number")]
    pub count: Option<f64>,

    #[serde(default, deserialize_with = "coerce::lenient_vec")]
    pub edges: Vec<Edge<TimelineNode>>,
}

/// A single timeline post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineNode {
    #[serde(default, deserialize_with = "coerce::string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "coerce::string")]
    pub shortcode: Option<String>,

    /// Unix seconds.
    #[serde(default, deserialize_with = "coerce::number")]
    pub taken_at_timestamp: Option<f64>,

    /// `GraphImage`, `GraphVideo` or `GraphSidecar`.
    #[serde(rename = "__typename", default, deserialize_with = "coerce::string")]
    pub typename: Option<String>,

    /// `feed`, `clips`, `igtv`, ...
    #[serde(default, deserialize_with = "coerce::string")]
    pub product_type: Option<String>,

    #[serde(default, deserialize_with = "coerce::truthy")]
    pub is_video: bool,

    #[serde(default, deserialize_with = "coerce::numeric")]
    pub video_view_count: coerce::Numeric,

    #[serde(default, deserialize_with = "coerce::number")]
    pub play_count: Option<f64>,

    #[serde(default, deserialize_with = "coerce::string")]
    pub display_url: Option<String>,

    #[serde(default, deserialize_with = "coerce::string")]
    pub thumbnail_src: Option<String>,

    #[serde(default, deserialize_with = "coerce::string")]
    pub accessibility_caption: Option<String>,

    #[serde(default, deserialize_with = "coerce::lenient")]
    pub dimensions: Option<Dimensions>,

    #[serde(default, deserialize_with = "coerce::lenient")]
    pub edge_media_to_caption: Option<EdgeList<CaptionNode>>,

    #[serde(default, deserialize_with = "coerce::lenient")]
    pub edge_liked_by: Option<EdgeCount>,

    #[serde(default, deserialize_with = "coerce::lenient")]
    pub edge_media_preview_like: Option<EdgeCount>,

    #[serde(default, deserialize_with = "coerce::lenient")]
    pub edge_media_to_parent_comment: Option<EdgeCount>,

    #[serde(default, deserialize_with = "coerce::lenient")]
    pub edge_media_to_comment: Option<EdgeCount>,

    /// Only present when an external enrichment step has filled it in.
    #[serde(default, deserialize_with = "coerce::number")]
    pub saves: Option<f64>,

    /// Only present when an external enrichment step has filled it in.
    #[serde(default, deserialize_with = "coerce::number")]
    pub shares: Option<f64>,
}

impl TimelineNode {
    /// Text of the first caption edge, if any.
    pub fn first_caption(&self) -> Option<&str> {
        self.edge_media_to_caption
            .as_ref()
            .and_then(|list| list.edges.first())
            .and_then(|edge| edge.node.as_ref())
            .and_then(|node| node.text.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dimensions {
    #[serde(default, deserialize_with = "coerce::number")]
    pub width: Option<f64>,

    #[serde(default, deserialize_with = "coerce::number")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionNode {
    #[serde(default, deserialize_with = "coerce::string")]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extract_user_requires_truthy_user() {
        assert!(extract_user(&json!({"data": {"user": {"id": "1"}}})).is_some());
        assert!(extract_user(&json!({"data": {"user": null}})).is_none());
        assert!(extract_user(&json!({"data": {}})).is_none());
        assert!(extract_user(&json!({"status": "ok"})).is_none());
        assert!(extract_user(&json!([1, 2, 3])).is_none());
        assert!(extract_user(&json!({"data": "nope"})).is_none());
    }

    #[test]
    fn from_value_tolerates_non_objects() {
        let user = UpstreamUser::from_value(json!(true));
        assert!(user.id.is_none());
        assert!(!user.is_private);
        assert_eq!(user.timeline_nodes().count(), 0);
    }

    #[test]
    fn timeline_nodes_skip_empty_wrappers() {
        let user = UpstreamUser::from_value(json!({
            "edge_owner_to_timeline_media": {
                "count": 3,
                "edges": [
                    {"node": {"id": "a"}},
                    {"cursor": "x"},
                    {"node": null},
                    "garbage",
                    {"node": {"id": "b"}},
                ]
            }
        }));

        let ids: Vec<_> = user
            .timeline_nodes()
            .map(|n| n.id.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn edges_not_an_array_yield_no_nodes() {
        let user = UpstreamUser::from_value(json!({
            "edge_owner_to_timeline_media": {"count": 9, "edges": {"node": {"id": "a"}}}
        }));
        assert_eq!(user.timeline_nodes().count(), 0);
        assert_eq!(EdgeCount::of(&None), None);
    }

    #[test]
    fn typename_is_read_from_dunder_field() {
        let node: TimelineNode =
            serde_json::from_value(json!({"__typename": "GraphVideo", "is_video": 1})).unwrap();
        assert_eq!(node.typename.as_deref(), Some("GraphVideo"));
        assert!(node.is_video);
    }

    #[test]
    fn first_caption_reads_first_edge_only() {
        let node: TimelineNode = serde_json::from_value(json!({
            "edge_media_to_caption": {"edges": [
                {"node": {"text": "first"}},
                {"node": {"text": "second"}},
            ]}
        }))
        .unwrap();
        assert_eq!(node.first_caption(), Some("first"));

        let bare = TimelineNode::default();
        assert_eq!(bare.first_caption(), None);
    }
}
