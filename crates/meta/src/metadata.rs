use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use toml::{Table, Value};

/// The declarative description of one blog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFile {
    /// Identifier derived from the object key, not from the document.
    pub file_name: String,
    pub category: String,
    pub tag: Vec<String>,
    pub title: String,
}

impl MetadataFile {
    /// Parse a metadata document.
    ///
    /// `category`, `tag` and `title` are required. Any other keys are
    /// ignored, including a `fileName` written into the document.
    pub fn parse(file_name: impl Into<String>, data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data).or_raise(|| ErrorKind::InvalidDocument("not valid UTF-8".to_string()))?;
        let table: Table = text.parse::<Table>().or_raise(|| ErrorKind::InvalidDocument("not valid TOML".to_string()))?;
        Ok(Self {
            file_name: file_name.into(),
            category: string_field(&table, "category")?,
            tag: string_list_field(&table, "tag")?,
            title: string_field(&table, "title")?,
        })
    }
}

fn field<'a>(table: &'a Table, name: &'static str) -> Result<&'a Value> {
    table.get(name).ok_or_raise(|| ErrorKind::MissingField(name))
}

fn mistyped(field: &'static str, value: &Value) -> ErrorKind {
    ErrorKind::ParseError { field, value: value.to_string() }
}

fn string_field(table: &Table, name: &'static str) -> Result<String> {
    let value = field(table, name)?;
    value.as_str().map(str::to_string).ok_or_raise(|| mistyped(name, value))
}

fn string_list_field(table: &Table, name: &'static str) -> Result<Vec<String>> {
    let value = field(table, name)?;
    let items = value.as_array().ok_or_raise(|| mistyped(name, value))?;
    items.iter().map(|item| item.as_str().map(str::to_string).ok_or_raise(|| mistyped(name, item))).collect()
}
