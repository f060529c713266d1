//! Typed filter expressions, rendered to Airtable formulas.

use std::fmt;

/// Columns a filter can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Slug,
    Title,
    Data,
    Password,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Slug => "slug",
            Field::Title => "title",
            Field::Data => "data",
            Field::Password => "password",
        }
    }
}

/// Equality of one field with a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: Field,
    pub value: String,
}

impl Filter {
    pub fn field_eq(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Matches records where `field` is blank or missing.
    pub fn field_empty(field: Field) -> Self {
        Self::field_eq(field, "")
    }

    /// The `filterByFormula` string for this expression.
    pub fn to_formula(&self) -> String {
        format!("{{{}}} = '{}'", self.field.name(), escape(&self.value))
    }

    /// Evaluate locally with the store's semantics: a missing field equals
    /// the empty string.
    #[cfg(any(test, feature = "test-util"))]
    pub fn matches(&self, fields: &crate::record::Fields) -> bool {
        fields.get(self.field).unwrap_or("") == self.value
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formula())
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Fields;

    #[test]
    fn slug_lookup_formula() {
        let filter = Filter::field_eq(Field::Slug, "my-notes-deja-vu");
        assert_eq!(filter.to_formula(), "{slug} = 'my-notes-deja-vu'");
    }

    #[test]
    fn public_listing_formula() {
        assert_eq!(Filter::field_empty(Field::Password).to_string(), "{password} = ''");
    }

    #[test]
    fn quotes_are_escaped() {
        let filter = Filter::field_eq(Field::Title, r"it's a \ test");
        assert_eq!(filter.to_formula(), r"{title} = 'it\'s a \\ test'");
    }

    #[test]
    fn missing_field_matches_empty() {
        let fields = Fields::document("a", "A", "body");
        assert!(Filter::field_empty(Field::Password).matches(&fields));
        assert!(Filter::field_eq(Field::Title, "A").matches(&fields));
        assert!(!Filter::field_eq(Field::Slug, "b").matches(&fields));
    }
}
