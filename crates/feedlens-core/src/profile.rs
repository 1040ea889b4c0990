//! Normalized output schema served to clients.

use serde::Serialize;

/// The normalized profile response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResult {
    /// The normalized username that was requested.
    pub username: String,
    pub profile: ProfileSummary,
    /// Most recent posts, newest first as returned upstream.
    pub posts: Vec<PostSummary>,
    /// Reserved for follower history; always empty.
    pub followers_history: Vec<serde_json::Value>,
}

impl ProfileResult {
    /// Serialize to the compact JSON body sent to clients.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Scalar profile fields with every value defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub id: String,
    pub is_private: bool,
    pub is_verified: bool,
    pub followers: u64,
    pub following: u64,
    pub posts_count: u64,
    pub biography: String,
    pub profile_pic_url: String,
    /// Username as spelled by upstream (may differ in case from the request).
    pub username: String,
}

/// Inferred post type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Post,
    Image,
    Video,
    Reel,
}

/// Per-post projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub id: String,
    pub shortcode: String,
    pub permalink: String,
    /// RFC 3339 UTC with milliseconds, or `null` when upstream has none.
    pub timestamp: Option<String>,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub is_video: bool,
    pub thumbnail_url: String,
    pub caption: String,
    pub likes: u64,
    pub comments: u64,
    /// Present only when the extended field set is configured.
    #[serde(flatten)]
    pub extended: Option<ExtendedPostFields>,
}

/// Fields emitted only with [`crate::PostFieldSet::Extended`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtendedPostFields {
    /// `null` rather than 0 so clients can tell "no views" from "not a video".
    pub video_views: Option<serde_json::Number>,
    pub accessibility_caption: Option<String>,
    /// Omitted entirely (not `null`) when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Passed through unchanged when an enrichment step supplied them.
    pub saves: Option<serde_json::Number>,
    pub shares: Option<serde_json::Number>,
}
