/// Mapping between object keys and catalog `fileName` values.
///
/// A metadata object lives at `<prefix><fileName><suffix>`. Keys that do not
/// carry both the prefix and the suffix, or that would leave an empty
/// `fileName`, belong to something else in the bucket and map to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    prefix: String,
    suffix: String,
}

impl KeyLayout {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), suffix: suffix.into() }
    }

    /// The key prefix, including its trailing slash (`meta/`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The prefix as a directory, suitable for a storage listing.
    ///
    /// Returns `None` for an empty prefix (list the whole bucket).
    pub fn dir(&self) -> Option<&str> {
        let dir = self.prefix.trim_end_matches('/');
        (!dir.is_empty()).then_some(dir)
    }

    /// Derive the `fileName` from an object key.
    pub fn file_name<'a>(&self, key: &'a str) -> Option<&'a str> {
        let name = key.strip_prefix(self.prefix.as_str())?.strip_suffix(self.suffix.as_str())?;
        if name.is_empty() {
            tracing::debug!(key, "Object key leaves an empty file name");
            return None;
        }
        Some(name)
    }

    /// Build the object key for a `fileName`.
    pub fn key(&self, file_name: &str) -> String {
        format!("{}{}{}", self.prefix, file_name, self.suffix)
    }

    /// Accept either a full object key or a bare `fileName`.
    ///
    /// Used for command line arguments, where both forms are convenient.
    pub fn resolve<'a>(&self, key_or_name: &'a str) -> &'a str {
        self.file_name(key_or_name).unwrap_or(key_or_name)
    }
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::new("meta/", ".toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("meta/hello.toml", Some("hello"))]
    #[case("meta/2024/hello-world.toml", Some("2024/hello-world"))]
    #[case("meta/my post.toml", Some("my post"))]
    #[case("meta/.toml", None)]
    #[case("meta/hello.md", None)]
    #[case("images/hello.toml", None)]
    #[case("hello.toml", None)]
    #[case("metahello.toml", None)]
    fn test_file_name(#[case] key: &str, #[case] expected: Option<&str>) {
        assert_eq!(KeyLayout::default().file_name(key), expected);
    }

    #[test]
    fn test_key_round_trip() {
        let layout = KeyLayout::default();
        assert_eq!(layout.key("hello"), "meta/hello.toml");
        assert_eq!(layout.file_name(&layout.key("hello")), Some("hello"));
    }

    #[rstest]
    #[case("meta/", Some("meta"))]
    #[case("blog/meta/", Some("blog/meta"))]
    #[case("", None)]
    fn test_dir(#[case] prefix: &str, #[case] expected: Option<&str>) {
        assert_eq!(KeyLayout::new(prefix, ".toml").dir(), expected);
    }

    #[test]
    fn test_resolve_accepts_both_forms() {
        let layout = KeyLayout::default();
        assert_eq!(layout.resolve("meta/hello.toml"), "hello");
        assert_eq!(layout.resolve("hello"), "hello");
    }
}
