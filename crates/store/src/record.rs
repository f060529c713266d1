use serde::{Deserialize, Serialize};

use crate::filter::{Field, Filter};

/// One stored note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Assigned by the store on creation.
    pub id: String,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Fields,
}

impl Record {
    /// The slug, if the record is published.
    pub fn slug(&self) -> Option<&str> {
        self.fields.slug.as_deref().filter(|slug| !slug.is_empty())
    }

    pub fn is_published(&self) -> bool {
        self.slug().is_some()
    }
}

/// Named columns of a record. Members left `None` are not sent, which is
/// what makes updates partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Computed column maintained by the store; never written.
    #[serde(rename = "createdAt", default, skip_serializing)]
    pub created_at: Option<String>,
}

impl Fields {
    /// The full set written on every publish.
    pub fn document(slug: impl Into<String>, title: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            title: Some(title.into()),
            data: Some(data.into()),
            ..Self::default()
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Slug => self.slug.as_deref(),
            Field::Title => self.title.as_deref(),
            Field::Data => self.data.as_deref(),
            Field::Password => self.password.as_deref(),
        }
    }

    /// Copy every member set in `changes` over `self`.
    pub fn merge(&mut self, changes: &Fields) {
        if let Some(slug) = &changes.slug {
            self.slug = Some(slug.clone());
        }
        if let Some(title) = &changes.title {
            self.title = Some(title.clone());
        }
        if let Some(data) = &changes.data {
            self.data = Some(data.clone());
        }
        if let Some(password) = &changes.password {
            self.password = Some(password.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slug.is_none() && self.title.is_none() && self.data.is_none() && self.password.is_none()
    }
}

/// Parameters of a single-page list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<Filter>,
    pub max_records: Option<u32>,
}

impl ListQuery {
    /// Every record on the first page.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(filter: Filter) -> Self {
        Self {
            filter: Some(filter),
            max_records: None,
        }
    }

    pub fn limit(mut self, max_records: u32) -> Self {
        self.max_records = Some(max_records);
        self
    }
}
