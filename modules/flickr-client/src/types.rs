use serde::{Deserialize, Deserializer};

// --- Request types ---

/// Which Flickr REST method a page request goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoMethod {
    /// `flickr.photos.getRecent`
    Recent,
    /// `flickr.photos.search` restricted by `tags`.
    SearchByTag(String),
}

impl PhotoMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoMethod::Recent => "flickr.photos.getRecent",
            PhotoMethod::SearchByTag(_) => "flickr.photos.search",
        }
    }
}

/// One page request against either the recent or the tag-search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoQuery {
    pub method: PhotoMethod,
    pub page: u32,
    pub per_page: u32,
}

impl PhotoQuery {
    /// An empty term means "recent photos"; anything else is a tag search.
    pub fn for_term(term: &str, page: u32, per_page: u32) -> Self {
        let method = if term.is_empty() {
            PhotoMethod::Recent
        } else {
            PhotoMethod::SearchByTag(term.to_string())
        };
        Self {
            method,
            page,
            per_page,
        }
    }

    /// Query-string parameters specific to this request (no key or format flags).
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("method", self.method.as_str().to_string())];
        if let PhotoMethod::SearchByTag(ref tags) = self.method {
            params.push(("tags", tags.clone()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("per_page", self.per_page.to_string()));
        params
    }
}

// --- Response types ---

/// Top-level response. Flickr reports failures in-band with `"stat": "fail"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "stat", rename_all = "lowercase")]
pub(crate) enum Envelope {
    Ok { photos: PhotoPage },
    Fail { code: i64, message: String },
}

/// A single page of photos as returned by getRecent / search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoPage {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub page: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub pages: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub perpage: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: u64,
    #[serde(rename = "photo", default)]
    pub photos: Vec<RawPhoto>,
}

/// A photo item as Flickr returns it: identifiers only, no URL.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPhoto {
    pub id: String,
    #[serde(default)]
    pub owner: Option<String>,
    pub secret: String,
    pub server: String,
    pub farm: i64,
    #[serde(default)]
    pub title: String,
}

impl RawPhoto {
    /// Static image URL built from the farm/server/id/secret identifiers.
    pub fn image_url(&self) -> String {
        format!(
            "https://farm{}.static.flickr.com/{}/{}_{}.jpg",
            self.farm, self.server, self.id, self.secret
        )
    }
}

/// Flickr is inconsistent about numeric fields: `total` comes back as a
/// string from search and as a number from getRecent.
fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
