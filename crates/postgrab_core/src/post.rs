use serde_json::Value;
use thiserror::Error;

/// One post as delivered by the listing API.
///
/// The attribute tree is kept verbatim; only the handful of fields the
/// downloader needs get typed accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    data: Value,
}

/// Collection, id and title segments of a permalink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permalink {
    pub collection: String,
    pub post_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermalinkError {
    #[error("post has no permalink")]
    Missing,
    #[error("permalink {0:?} does not look like /r/<name>/comments/<id>/<title>/")]
    Malformed(String),
}

impl PostRecord {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Listing fullname (`t3_...`), used to recognise repeated posts.
    pub fn fullname(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }

    pub fn permalink_str(&self) -> Option<&str> {
        self.data.get("permalink").and_then(Value::as_str)
    }

    pub fn is_video(&self) -> bool {
        self.data
            .get("is_video")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn permalink(&self) -> Result<Permalink, PermalinkError> {
        let raw = self.permalink_str().ok_or(PermalinkError::Missing)?;
        Permalink::parse(raw)
    }
}

impl Permalink {
    /// Splits `/r/<collection>/comments/<id>/<title>/` into its parts.
    ///
    /// Absolute links are accepted as well; only the path is looked at.
    pub fn parse(raw: &str) -> Result<Self, PermalinkError> {
        let path = match url::Url::parse(raw) {
            Ok(url) => url.path().to_string(),
            Err(_) => raw.to_string(),
        };
        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            ["", "r", collection, "comments", post_id, title, ..]
                if !collection.is_empty() && !post_id.is_empty() && !title.is_empty() =>
            {
                Ok(Self {
                    collection: (*collection).to_string(),
                    post_id: (*post_id).to_string(),
                    title: (*title).to_string(),
                })
            }
            _ => Err(PermalinkError::Malformed(raw.to_string())),
        }
    }

    /// Directory name holding this post's media: `<id>_<title>`.
    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.post_id, self.title)
    }
}

/// JSON document URL for a post link.
pub fn post_json_url(link: &str) -> String {
    if link.contains(".json") {
        link.to_string()
    } else {
        format!("{link}.json")
    }
}

/// Pulls the post out of a single-post document: `[ { data: { children: [ { data } ] } }, ... ]`.
pub fn post_from_document(document: &Value) -> Option<PostRecord> {
    document
        .get(0)?
        .get("data")?
        .get("children")?
        .get(0)?
        .get("data")
        .filter(|data| data.is_object())
        .map(|data| PostRecord::new(data.clone()))
}
