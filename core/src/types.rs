//! Response envelopes and the pieces shared by every resource.

use serde::{Deserialize, Deserializer, Serialize};
use url::form_urlencoded;

/// Filter parameters that can be encoded into a list query string.
pub trait QueryParams {
    fn populate_qp(&self, qp: &mut form_urlencoded::Serializer<'_, String>);
}

impl QueryParams for () {
    fn populate_qp(&self, _qp: &mut form_urlencoded::Serializer<'_, String>) {}
}

/// Append `key=value` only when the filter is set.
pub(crate) fn append_filter(qp: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        qp.append_pair(key, value);
    }
}

/// The `{"data": ...}` wrapper around every read response.
///
/// A missing or `null` `data` decodes to `T::default()`: an empty list, or a
/// zero record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct DataEnvelope<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: T,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of a create. `data` is the identifier of the new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default)]
    pub errors: u64,
}

/// Counters returned by update and delete.
///
/// Failures are reported as a count. The server may name the first one in
/// `first_error`, but individual failed records are never itemized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyResult {
    pub skipped: u64,
    pub deleted: u64,
    pub unchanged: u64,
    pub replaced: u64,
    pub errors: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
}

impl ModifyResult {
    /// Number of records the mutation matched. Saturates at `u64::MAX`.
    pub fn total(&self) -> u64 {
        [self.deleted, self.unchanged, self.replaced, self.errors]
            .into_iter()
            .fold(self.skipped, u64::saturating_add)
    }
}
