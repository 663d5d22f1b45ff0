//! Logical cell addresses and their string keys.
//!
//! A [`LogicalAddress`] names a form cell by `(column, line)` independent of
//! where it was rendered. [`AddressKey`] is its string form, used to key
//! selections; the two convert losslessly in both directions.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The `(column, line)` identity of a form cell. Both indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogicalAddress {
    pub column: usize,
    pub line: usize,
}

impl LogicalAddress {
    pub fn new(column: usize, line: usize) -> Self {
        Self { column, line }
    }

    pub fn key(&self) -> AddressKey {
        AddressKey::from(*self)
    }
}

impl fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column {}, line {}",
            self.column.saturating_add(1),
            self.line.saturating_add(1)
        )
    }
}

/// The string key of a [`LogicalAddress`], formatted as `col-{column}-line-{line}`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct AddressKey(Arc<str>);

const COLUMN_PREFIX: &str = "col-";
const LINE_SEPARATOR: &str = "-line-";

impl AddressKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recovers the address this key was built from.
    pub fn address(&self) -> LogicalAddress {
        // Keys are only constructed from addresses or validated by `FromStr`.
        parse_key(&self.0).unwrap_or_default()
    }
}

impl Default for LogicalAddress {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl From<LogicalAddress> for AddressKey {
    fn from(address: LogicalAddress) -> Self {
        Self(
            format!(
                "{COLUMN_PREFIX}{}{LINE_SEPARATOR}{}",
                address.column, address.line
            )
            .into(),
        )
    }
}

impl AsRef<str> for AddressKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAddressKeyError(String);

impl fmt::Display for ParseAddressKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid address key '{}', expected 'col-<n>-line-<n>'",
            self.0
        )
    }
}

impl std::error::Error for ParseAddressKeyError {}

fn parse_key(s: &str) -> Option<LogicalAddress> {
    let rest = s.strip_prefix(COLUMN_PREFIX)?;
    let (column, line) = rest.split_once(LINE_SEPARATOR)?;
    // Reject signs and leading zeros so that parsing stays the exact inverse of formatting.
    let canonical = |digits: &str| {
        !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'))
    };
    if !canonical(column) || !canonical(line) {
        return None;
    }
    Some(LogicalAddress::new(column.parse().ok()?, line.parse().ok()?))
}

impl FromStr for AddressKey {
    type Err = ParseAddressKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s)
            .map(AddressKey::from)
            .ok_or_else(|| ParseAddressKeyError(s.to_string()))
    }
}

impl Serialize for AddressKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AddressKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
