//! Projection of upstream profiles into the [`ProfileResult`] schema.
//!
//! Every function here is total: malformed or missing upstream data degrades
//! to the documented default and never produces an error.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::coerce;
use crate::error::Error;
use crate::profile::{ExtendedPostFields, PostKind, PostSummary, ProfileResult, ProfileSummary};
use crate::upstream::{self, EdgeCount, TimelineNode, UpstreamUser};
use crate::username::Username;

/// Posts kept per profile unless configured otherwise.
pub const DEFAULT_POST_LIMIT: usize = 24;

/// Base of the synthesized post permalink.
const PERMALINK_BASE: &str = "https://www.instagram.com/p";

/// Which per-post fields to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostFieldSet {
    /// Every field, including view counts, dimensions and enrichment slots.
    #[default]
    Extended,
    /// Identity, type, thumbnail, caption, likes and comments only.
    Basic,
}

impl FromStr for PostFieldSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extended" | "full" => Ok(Self::Extended),
            "basic" | "minimal" => Ok(Self::Basic),
            other => Err(Error::InvalidFieldSet(other.to_string())),
        }
    }
}

impl fmt::Display for PostFieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extended => "extended",
            Self::Basic => "basic",
        })
    }
}

/// Knobs for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Maximum number of posts to keep; `None` keeps whatever upstream sent.
    pub post_limit: Option<usize>,
    pub fields: PostFieldSet,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            post_limit: Some(DEFAULT_POST_LIMIT),
            fields: PostFieldSet::Extended,
        }
    }
}

/// Normalize a decoded upstream response body.
///
/// Returns `None` when the body carries no user, which callers report as
/// "not found".
pub fn normalize_payload(
    username: &Username,
    body: &Value,
    options: &NormalizeOptions,
) -> Option<ProfileResult> {
    let user = upstream::extract_user(body)?;
    let user = UpstreamUser::from_value(user.clone());
    Some(normalize(username, &user, options))
}

/// Normalize a single upstream user.
pub fn normalize(
    username: &Username,
    user: &UpstreamUser,
    options: &NormalizeOptions,
) -> ProfileResult {
    let limit = options.post_limit.unwrap_or(usize::MAX);
    let posts = user
        .timeline_nodes()
        .take(limit)
        .map(|node| normalize_post(node, options.fields))
        .collect();

    ProfileResult {
        username: username.as_str().to_string(),
        profile: summarize_profile(user),
        posts,
        followers_history: Vec::new(),
    }
}

fn summarize_profile(user: &UpstreamUser) -> ProfileSummary {
    let media_count = user
        .edge_owner_to_timeline_media
        .as_ref()
        .and_then(|media| media.count);

    ProfileSummary {
        id: user.id.clone().unwrap_or_default(),
        is_private: user.is_private,
        is_verified: user.is_verified,
        followers: coerce::count(EdgeCount::of(&user.edge_followed_by)),
        following: coerce::count(EdgeCount::of(&user.edge_follow)),
        posts_count: coerce::count(media_count),
        biography: user.biography.clone().unwrap_or_default(),
        profile_pic_url: first_non_empty([&user.profile_pic_url_hd, &user.profile_pic_url]),
        username: user.username.clone().unwrap_or_default(),
    }
}

/// Project one timeline node.
pub fn normalize_post(node: &TimelineNode, fields: PostFieldSet) -> PostSummary {
    let shortcode = node.shortcode.clone().unwrap_or_default();

    let extended = match fields {
        PostFieldSet::Basic => None,
        PostFieldSet::Extended => Some(extended_fields(node)),
    };

    PostSummary {
        id: node.id.clone().unwrap_or_default(),
        permalink: format!("{PERMALINK_BASE}/{shortcode}/"),
        shortcode,
        timestamp: node.taken_at_timestamp.and_then(iso_timestamp),
        kind: infer_post_kind(node.product_type.as_deref(), node.typename.as_deref()),
        is_video: node.is_video,
        thumbnail_url: first_non_empty([&node.display_url, &node.thumbnail_src]),
        caption: node.first_caption().unwrap_or_default().to_string(),
        likes: coerce::count(
            EdgeCount::of(&node.edge_liked_by).or(EdgeCount::of(&node.edge_media_preview_like)),
        ),
        comments: coerce::count(
            EdgeCount::of(&node.edge_media_to_parent_comment)
                .or(EdgeCount::of(&node.edge_media_to_comment)),
        ),
        extended,
    }
}

fn extended_fields(node: &TimelineNode) -> ExtendedPostFields {
    let dimensions = node.dimensions.as_ref();
    let dimension = |value: Option<f64>| {
        coerce::nonzero_count(value).and_then(|v| u32::try_from(v).ok())
    };

    ExtendedPostFields {
        video_views: node
            .video_view_count
            .or(node.play_count)
            .filter(|views| *views != 0.0)
            .and_then(coerce::json_number),
        accessibility_caption: node
            .accessibility_caption
            .clone()
            .filter(|caption| !caption.is_empty()),
        width: dimension(dimensions.and_then(|d| d.width)),
        height: dimension(dimensions.and_then(|d| d.height)),
        saves: node.saves.and_then(coerce::json_number),
        shares: node.shares.and_then(coerce::json_number),
    }
}

/// Infer the post type.
///
/// A product type mentioning clips or reels wins over the type tag, so a
/// reel tagged `GraphImage` is still a reel.
pub fn infer_post_kind(product_type: Option<&str>, typename: Option<&str>) -> PostKind {
    let product_type = product_type.unwrap_or_default().to_lowercase();
    if product_type.contains("clip") || product_type.contains("reel") {
        return PostKind::Reel;
    }

    let typename = typename.unwrap_or_default();
    if typename.contains("GraphVideo") {
        PostKind::Video
    } else if typename.contains("GraphSidecar") || typename.contains("GraphImage") {
        PostKind::Image
    } else {
        PostKind::Post
    }
}

/// Unix seconds to `YYYY-MM-DDTHH:MM:SS.sssZ`. Zero and out-of-range
/// values yield `None`.
fn iso_timestamp(seconds: f64) -> Option<String> {
    if seconds == 0.0 || !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).trunc() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn first_non_empty<const N: usize>(candidates: [&Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: Value) -> UpstreamUser {
        UpstreamUser::from_value(value)
    }

    fn alice() -> Username {
        Username::parse("alice").unwrap()
    }

    fn timeline(nodes: Vec<Value>) -> Value {
        let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
        json!({
            "edge_owner_to_timeline_media": { "count": edges.len(), "edges": edges }
        })
    }

    #[test]
    fn empty_user_yields_all_defaults() {
        let result = normalize(&alice(), &UpstreamUser::default(), &NormalizeOptions::default());

        assert_eq!(result.username, "alice");
        assert_eq!(result.profile, ProfileSummary::default());
        assert_eq!(result.profile.followers, 0);
        assert_eq!(result.profile.biography, "");
        assert!(!result.profile.is_private);
        assert!(!result.profile.is_verified);
        assert!(result.posts.is_empty());
        assert!(result.followers_history.is_empty());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["followers_history"], json!([]));
    }

    #[test]
    fn profile_scalars_are_projected() {
        let result = normalize(
            &alice(),
            &user(json!({
                "id": 123456789,
                "username": "Alice",
                "is_private": 0,
                "is_verified": true,
                "biography": "hello",
                "profile_pic_url": "https://cdn/low.jpg",
                "profile_pic_url_hd": "https://cdn/hd.jpg",
                "edge_followed_by": { "count": 1500 },
                "edge_follow": { "count": "42" },
                "edge_owner_to_timeline_media": { "count": 7, "edges": [] },
            })),
            &NormalizeOptions::default(),
        );

        let profile = &result.profile;
        assert_eq!(profile.id, "123456789");
        assert_eq!(profile.username, "Alice");
        assert!(!profile.is_private);
        assert!(profile.is_verified);
        assert_eq!(profile.biography, "hello");
        assert_eq!(profile.profile_pic_url, "https://cdn/hd.jpg");
        assert_eq!(profile.followers, 1500);
        assert_eq!(profile.following, 42);
        assert_eq!(profile.posts_count, 7);
    }

    #[test]
    fn profile_pic_falls_back_when_hd_is_blank() {
        let result = normalize(
            &alice(),
            &user(json!({ "profile_pic_url_hd": "", "profile_pic_url": "https://cdn/low.jpg" })),
            &NormalizeOptions::default(),
        );
        assert_eq!(result.profile.profile_pic_url, "https://cdn/low.jpg");
    }

    #[test]
    fn non_numeric_counts_default_to_zero() {
        let result = normalize(
            &alice(),
            &user(json!({
                "edge_followed_by": { "count": "lots" },
                "edge_follow": "not an object",
                "edge_owner_to_timeline_media": { "count": -3 },
            })),
            &NormalizeOptions::default(),
        );
        assert_eq!(result.profile.followers, 0);
        assert_eq!(result.profile.following, 0);
        assert_eq!(result.profile.posts_count, 0);
    }

    #[test]
    fn full_post_is_mapped() {
        let u = user(timeline(vec![json!({
            "id": "31",
            "shortcode": "Cx1",
            "taken_at_timestamp": 1_700_000_000,
            "__typename": "GraphVideo",
            "product_type": "igtv",
            "is_video": true,
            "video_view_count": 980,
            "display_url": "https://cdn/display.jpg",
            "thumbnail_src": "https://cdn/thumb.jpg",
            "accessibility_caption": "a cat",
            "dimensions": { "width": 1080, "height": 1350 },
            "edge_media_to_caption": { "edges": [{ "node": { "text": "meow" } }] },
            "edge_liked_by": { "count": 55 },
            "edge_media_preview_like": { "count": 1 },
            "edge_media_to_parent_comment": { "count": 4 },
            "edge_media_to_comment": { "count": 9 },
        })]));

        let result = normalize(&alice(), &u, &NormalizeOptions::default());
        let post = &result.posts[0];

        assert_eq!(post.id, "31");
        assert_eq!(post.shortcode, "Cx1");
        assert_eq!(post.permalink, "https://www.instagram.com/p/Cx1/");
        assert_eq!(post.timestamp.as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(post.kind, PostKind::Video);
        assert!(post.is_video);
        assert_eq!(post.thumbnail_url, "https://cdn/display.jpg");
        assert_eq!(post.caption, "meow");
        assert_eq!(post.likes, 55);
        assert_eq!(post.comments, 4);

        let extended = post.extended.as_ref().unwrap();
        assert_eq!(extended.video_views, Some(980.into()));
        assert_eq!(extended.accessibility_caption.as_deref(), Some("a cat"));
        assert_eq!(extended.width, Some(1080));
        assert_eq!(extended.height, Some(1350));
        assert_eq!(extended.saves, None);
        assert_eq!(extended.shares, None);
    }

    #[test]
    fn sparse_post_uses_fallbacks() {
        let u = user(timeline(vec![json!({
            "thumbnail_src": "https://cdn/thumb.jpg",
            "play_count": 12,
            "edge_media_preview_like": { "count": 8 },
            "edge_media_to_comment": { "count": 2 },
            "saves": 3,
            "shares": "5",
        })]));

        let post = &normalize(&alice(), &u, &NormalizeOptions::default()).posts[0];
        let extended = post.extended.as_ref().unwrap();

        assert_eq!(post.id, "");
        assert_eq!(post.permalink, "https://www.instagram.com/p//");
        assert_eq!(post.timestamp, None);
        assert_eq!(post.kind, PostKind::Post);
        assert!(!post.is_video);
        assert_eq!(post.thumbnail_url, "https://cdn/thumb.jpg");
        assert_eq!(post.caption, "");
        assert_eq!(post.likes, 8);
        assert_eq!(post.comments, 2);
        assert_eq!(extended.video_views, Some(12.into()));
        assert_eq!(extended.accessibility_caption, None);
        assert_eq!(extended.width, None);
        assert_eq!(extended.saves, Some(3.into()));
        assert_eq!(extended.shares, Some(5.into()));
    }

    #[test]
    fn zero_views_are_null_and_do_not_fall_through() {
        let u = user(timeline(vec![json!({ "video_view_count": 0, "play_count": 99 })]));
        let post = &normalize(&alice(), &u, &NormalizeOptions::default()).posts[0];
        assert_eq!(post.extended.as_ref().unwrap().video_views, None);
    }

    #[test]
    fn enrichment_counts_pass_through_unchanged() {
        let u = user(timeline(vec![json!({
            "saves": -3,
            "shares": 2.5,
            "video_view_count": "abc",
            "play_count": 5,
        })]));
        let post = &normalize(&alice(), &u, &NormalizeOptions::default()).posts[0];
        let value = serde_json::to_value(post).unwrap();

        assert_eq!(value["saves"], json!(-3));
        assert_eq!(value["shares"], json!(2.5));
        assert_eq!(value["video_views"], json!(null));
    }

    #[test]
    fn unparseable_saves_are_null() {
        let u = user(timeline(vec![json!({ "saves": "lots", "shares": null })]));
        let post = &normalize(&alice(), &u, &NormalizeOptions::default()).posts[0];
        let extended = post.extended.as_ref().unwrap();
        assert_eq!(extended.saves, None);
        assert_eq!(extended.shares, None);
    }

    #[test]
    fn null_view_count_falls_through_to_play_count() {
        let u = user(timeline(vec![json!({ "video_view_count": null, "play_count": 7.5 })]));
        let post = &normalize(&alice(), &u, &NormalizeOptions::default()).posts[0];
        let value = serde_json::to_value(post).unwrap();
        assert_eq!(value["video_views"], json!(7.5));
    }

    #[test]
    fn null_like_count_falls_through_to_preview() {
        let u = user(timeline(vec![json!({
            "edge_liked_by": { "count": null },
            "edge_media_preview_like": { "count": 17 },
        })]));
        let post = &normalize(&alice(), &u, &NormalizeOptions::default()).posts[0];
        assert_eq!(post.likes, 17);
    }

    #[test]
    fn reel_product_type_beats_type_tag() {
        assert_eq!(infer_post_kind(Some("REELS"), Some("GraphImage")), PostKind::Reel);
        assert_eq!(infer_post_kind(Some("clips"), Some("GraphVideo")), PostKind::Reel);
        assert_eq!(infer_post_kind(Some("feed"), Some("GraphVideo")), PostKind::Video);
        assert_eq!(infer_post_kind(None, Some("GraphSidecar")), PostKind::Image);
        assert_eq!(infer_post_kind(None, Some("GraphImage")), PostKind::Image);
        assert_eq!(infer_post_kind(None, Some("XDTGraphImage")), PostKind::Image);
        assert_eq!(infer_post_kind(Some(""), Some("")), PostKind::Post);
        assert_eq!(infer_post_kind(None, None), PostKind::Post);
    }

    #[test]
    fn type_tag_match_is_case_sensitive() {
        assert_eq!(infer_post_kind(None, Some("graphvideo")), PostKind::Post);
    }

    #[test]
    fn posts_are_capped_in_upstream_order() {
        let nodes = (0..30).map(|i| json!({ "id": i.to_string() })).collect();
        let u = user(timeline(nodes));

        let capped = normalize(&alice(), &u, &NormalizeOptions::default());
        assert_eq!(capped.posts.len(), DEFAULT_POST_LIMIT);
        assert_eq!(capped.posts[0].id, "0");
        assert_eq!(capped.posts[23].id, "23");

        let unbounded = NormalizeOptions {
            post_limit: None,
            ..NormalizeOptions::default()
        };
        assert_eq!(normalize(&alice(), &u, &unbounded).posts.len(), 30);

        let tight = NormalizeOptions {
            post_limit: Some(2),
            ..NormalizeOptions::default()
        };
        assert_eq!(normalize(&alice(), &u, &tight).posts.len(), 2);
    }

    #[test]
    fn basic_field_set_drops_extended_fields() {
        let u = user(timeline(vec![json!({ "id": "1", "video_view_count": 10 })]));
        let options = NormalizeOptions {
            fields: PostFieldSet::Basic,
            ..NormalizeOptions::default()
        };

        let post = &normalize(&alice(), &u, &options).posts[0];
        assert!(post.extended.is_none());

        let value = serde_json::to_value(post).unwrap();
        assert!(value.get("video_views").is_none());
        assert_eq!(value["id"], "1");
    }

    #[test]
    fn timestamp_rendering() {
        assert_eq!(iso_timestamp(0.0), None);
        assert_eq!(
            iso_timestamp(1_704_067_200.0).as_deref(),
            Some("2024-01-01T00:00:00.000Z")
        );
        assert_eq!(
            iso_timestamp(1_704_067_200.5).as_deref(),
            Some("2024-01-01T00:00:00.500Z")
        );
        assert_eq!(iso_timestamp(1e300), None);
    }

    #[test]
    fn normalize_payload_requires_user() {
        let options = NormalizeOptions::default();
        assert!(normalize_payload(&alice(), &json!({ "data": { "user": null } }), &options).is_none());
        assert!(normalize_payload(&alice(), &json!({}), &options).is_none());

        let result = normalize_payload(
            &alice(),
            &json!({ "data": { "user": { "edge_followed_by": { "count": 3 } } } }),
            &options,
        )
        .unwrap();
        assert_eq!(result.profile.followers, 3);
    }

    #[test]
    fn field_set_parsing() {
        assert_eq!("extended".parse::<PostFieldSet>().unwrap(), PostFieldSet::Extended);
        assert_eq!(" Basic ".parse::<PostFieldSet>().unwrap(), PostFieldSet::Basic);
        assert!(matches!(
            "everything".parse::<PostFieldSet>(),
            Err(Error::InvalidFieldSet(_))
        ));
        assert_eq!(PostFieldSet::Basic.to_string(), "basic");
    }
}
