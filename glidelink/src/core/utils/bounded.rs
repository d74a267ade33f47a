use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

use crate::prelude::*;

/// Owned text with a maximum length of `N` characters.
///
/// The length invariant is checked once at construction, after that the value can be passed
/// around freely. Length is measured in characters, not bytes, so non-ASCII names take the same
/// budget as ASCII ones.
///
/// ```rust
/// use glidelink::core::utils::BoundedText;
///
/// let name = BoundedText::<8>::new("Vario").unwrap();
/// assert_eq!(name.as_str(), "Vario");
///
/// assert!(BoundedText::<4>::new("Vario").is_err());
/// assert_eq!(BoundedText::<4>::truncated("Vario").as_str(), "Vari");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundedText<const N: usize>(String);

impl<const N: usize> BoundedText<N> {
    /// Maximum length in characters.
    pub const CAPACITY: usize = N;

    /// Creates bounded text, fails with [`Error::TextTooLong`] if `text` exceeds capacity.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let len = text.chars().count();
        if len > N {
            return Err(Error::TextTooLong { len, capacity: N });
        }
        Ok(Self(text))
    }

    /// Creates bounded text keeping at most `N` first characters of `text`.
    pub fn truncated(text: &str) -> Self {
        Self(text.chars().take(N).collect())
    }

    /// Text as a string slice.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Returns `true` if text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> Deref for BoundedText<N> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl<const N: usize> TryFrom<&str> for BoundedText<N> {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl<const N: usize> TryFrom<String> for BoundedText<N> {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl<const N: usize> Display for BoundedText<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<const N: usize> Debug for BoundedText<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

#[cfg(feature = "serde")]
impl<'de, const N: usize> serde::Deserialize<'de> for BoundedText<N> {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::new(text).map_err(serde::de::Error::custom)
    }
}
