use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// A single dictionary entry. The id is the only field the sync core relies
/// on; display fields are passed through to the presentation layer.
///
/// The backend is inconsistent about the id key (`id` from search, `_id` from
/// the admin endpoints), so both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub japanese: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub myanmar: Option<String>,
    #[serde(default)]
    pub sub_term: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            japanese: None,
            english: None,
            myanmar: None,
            sub_term: None,
            image_url: None,
            created_at: None,
            updated_at: None,
        }
    }
}

fn first_page() -> u32 {
    1
}

/// One page of results as returned by the backend. Every field defaults, so a
/// malformed reply (missing item list, missing metadata) decodes as an empty
/// final page instead of failing — pagination simply stops.
///
/// The item list key varies per endpoint (`words`, `items`, `favorites`); all
/// three are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    #[serde(default, alias = "words", alias = "favorites")]
    pub items: Vec<Entry>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default = "first_page")]
    pub current_page: u32,
}

impl ResultPage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            total_count: 0,
            current_page: 1,
        }
    }
}

/// The search endpoint returns either a bare entry list or a paginated
/// object, depending on backend version. Decoded as an untagged union and
/// normalized to a [`ResultPage`] immediately.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchReply {
    Entries(Vec<Entry>),
    Page(ResultPage),
}

impl SearchReply {
    pub fn into_page(self) -> ResultPage {
        match self {
            SearchReply::Entries(items) => {
                let total_count = items.len() as u64;
                ResultPage {
                    items,
                    has_more: false,
                    total_count,
                    current_page: 1,
                }
            }
            SearchReply::Page(page) => page,
        }
    }
}

/// Grouping key the backend uses when reporting duplicate entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateKey {
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub japanese: Option<String>,
    #[serde(default)]
    pub sub_term: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    #[serde(rename = "_id")]
    pub key: DuplicateKey,
    #[serde(default)]
    pub words: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatePage {
    #[serde(default)]
    pub groups: Vec<DuplicateGroup>,
    #[serde(default)]
    pub total_groups: u64,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default = "first_page")]
    pub current_page: u32,
}

#[derive(Debug, Deserialize)]
pub struct LoginReply {
    pub token: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct MessageReply {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub searches_left: Option<i64>,
}

/// Fields for creating or editing an entry. Sent as multipart form data since
/// the backend shares the endpoint with image uploads.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub english: String,
    pub japanese: Option<String>,
    pub myanmar: Option<String>,
    pub sub_term: Option<String>,
}

/// An image attached to a create/update call.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

/// A spreadsheet of entries for bulk import, already base64-encoded by the
/// caller (the file picker hands it over in that form).
#[derive(Debug, Clone)]
pub struct WorkbookUpload {
    pub file_name: String,
    pub file_data: String,
    pub file_type: String,
}
