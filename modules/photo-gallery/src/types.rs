use flickr_client::RawPhoto;
use serde::{Deserialize, Serialize};

/// A displayable photo: the static image URL plus its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub image_url: String,
    pub title: String,
}

impl From<&RawPhoto> for Photo {
    fn from(raw: &RawPhoto) -> Self {
        Self {
            id: raw.id.clone(),
            image_url: raw.image_url(),
            title: raw.title.clone(),
        }
    }
}

/// What the presentation layer renders for the current query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState {
    pub loading: bool,
    pub error: bool,
    /// Accumulated across pages of one query; cleared only on query change.
    pub photos: Vec<Photo>,
    /// True iff the most recently applied page had at least one item.
    pub has_more: bool,
}

impl FetchState {
    /// Nothing to show and nothing on the way ("No Result").
    pub fn is_empty_result(&self) -> bool {
        self.photos.is_empty() && !self.loading
    }

    /// Gate for the "last item became visible" signal.
    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.loading
    }
}
