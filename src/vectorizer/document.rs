use serde::{Deserialize, Serialize};

/// The minimal view of a content item the engine depends on.
///
/// Implement this for your own post type to rank it directly; the ranked
/// results hand back references to the original values.
pub trait Tagged {
    /// Stable unique identifier (slug)
    fn id(&self) -> &str;
    /// Tag list, repeats allowed, may be empty
    fn tags(&self) -> &[String];
}

/// Plain document carrying only the two fields the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Document {
    pub fn new<I, T>(id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            id: id.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

impl Tagged for Document {
    #[inline]
    fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl<T: Tagged + ?Sized> Tagged for &T {
    #[inline]
    fn id(&self) -> &str {
        (**self).id()
    }

    #[inline]
    fn tags(&self) -> &[String] {
        (**self).tags()
    }
}
