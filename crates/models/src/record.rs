use crate::errors::ModelError;

/// An ordered mapping of field name to string value.
///
/// All records of one collection share the same field set in the same order
/// (the collection header). Values are stored as text; consumers parse
/// numeric or timestamp fields on read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Field order is significant; callers keep names unique.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Builder-style variant of [`push`](Record::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Rebuild a record from a header and one positionally-matching row.
    pub fn from_row(header: &[String], values: Vec<String>) -> Self {
        let fields = header.iter().cloned().zip(values).collect();
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Record::get), but a missing field is a parse error.
    pub fn require(&self, name: &str) -> Result<&str, ModelError> {
        self.get(name)
            .ok_or_else(|| ModelError::Parse(format!("missing field `{name}`")))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
