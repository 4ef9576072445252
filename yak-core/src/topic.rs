use std::fmt;

/// A topic name.
///
/// Topic names are opaque identifiers from the broker's point of view; no
/// escaping is performed beyond the constraints imposed by the filesystem
/// path in which the log is stored. The only constraint enforced here is that
/// the name can appear as a single path segment under the broker's data
/// directory: non-empty, and free of `/` and NUL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TopicName(String);

impl TopicName {
    pub fn parse(name: impl Into<String>) -> Result<Self, InvalidTopicName> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidTopicName::Empty);
        }
        if name.contains('/') || name.contains('\0') {
            return Err(InvalidTopicName::IllegalPathSegment(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TopicName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when a string cannot be used as a [`TopicName`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidTopicName {
    #[error("topic name must not be empty")]
    Empty,
    #[error("topic name {0:?} is not a valid filesystem path segment")]
    IllegalPathSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_slash_containing_names() {
        assert!(TopicName::parse("").is_err());
        assert!(TopicName::parse("a/b").is_err());
        assert!(TopicName::parse("orders").is_ok());
    }

    #[test]
    fn serializes_as_bare_string() {
        let t = TopicName::parse("orders").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"orders\"");
    }
}
