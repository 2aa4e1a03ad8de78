use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A blob store address in the `"<bucket>/<key>"` form used on the wire and
/// in persisted file descriptors.
///
/// The split is on the *first* `/` only — keys may themselves contain
/// slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobAddress {
    pub bucket: String,
    pub key: String,
}

impl BlobAddress {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse a `"<bucket>/<key>"` string, rejecting addresses with no
    /// separator or an empty bucket/key.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
                Ok(Self::new(bucket, key))
            }
            _ => Err(CoreError::InvalidBlobAddress(s.to_string())),
        }
    }
}

impl fmt::Display for BlobAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

impl FromStr for BlobAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
