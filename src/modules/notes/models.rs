use serde::Serialize;
use sharenote_store::Record;

/// Entry of the public listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub slug: String,
    pub title: String,
    pub created_at: Option<String>,
}

/// A single published note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetail {
    pub slug: String,
    pub title: String,
    pub data: String,
    pub created_at: Option<String>,
}

impl NoteSummary {
    /// `None` for records without a slug.
    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            slug: record.slug()?.to_string(),
            title: record.fields.title.clone().unwrap_or_default(),
            created_at: created_at(record),
        })
    }
}

impl From<Record> for NoteDetail {
    fn from(record: Record) -> Self {
        let created_at = created_at(&record);
        let fields = record.fields;
        Self {
            slug: fields.slug.unwrap_or_default(),
            title: fields.title.unwrap_or_default(),
            data: fields.data.unwrap_or_default(),
            created_at,
        }
    }
}

// Prefer the table's own column, fall back to the store's creation time.
fn created_at(record: &Record) -> Option<String> {
    record
        .fields
        .created_at
        .clone()
        .or_else(|| record.created_time.clone())
}
