//! The record abstraction shared by every synchronized collection.

use crate::{error::Result, RecordId};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// A remotely owned record with an immutable, server-assigned identity.
///
/// Implementors also describe the two payload shapes the remote accepts:
/// a draft for creation and a patch for updates. The patch is where fields the
/// remote does not accept on the edit path (identity, server-computed values)
/// are stripped.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Payload sent when creating a record.
    type Draft: Clone + Debug + Serialize + Send + Sync + 'static;
    /// Payload sent when updating a record.
    type Patch: Clone + Debug + Serialize + Send + Sync + 'static;

    /// The identity key.
    fn id(&self) -> RecordId;

    /// Shape the outgoing update payload from a full local record.
    fn to_patch(&self) -> Self::Patch;

    /// Build the local provisional record for a draft whose identity is known.
    fn from_draft(id: RecordId, draft: &Self::Draft) -> Self;

    /// Check a draft before it is proposed.
    fn validate_draft(_draft: &Self::Draft) -> Result<()> {
        Ok(())
    }
}

/// Deserializers for numeric fields that may arrive as strings from form input.
pub(crate) mod lenient {
    use serde::{de, Deserialize, Deserializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Value(T),
        Text(String),
    }

    /// Accept a number, a numeric string, `null` or an empty string.
    pub fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
    {
        match Option::<Lenient<T>>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Lenient::Value(value)) => Ok(Some(value)),
            Some(Lenient::Text(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse()
                    .map(Some)
                    .map_err(|_| de::Error::custom(format!("invalid number: {text:?}")))
            }
        }
    }
}
