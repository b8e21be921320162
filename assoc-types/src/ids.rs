//! Record identifiers for BrandAssoc.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::CodecError;

const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier of a single record.
///
/// Format: `<unix-millis>-<7 base36 chars>`. The time component keeps ids
/// roughly ordered; the random suffix separates ids minted in the same
/// millisecond. Uniqueness is probabilistic only.
///
/// Deserialization goes through [`RecordId::parse`], so a decoded id always
/// maps to a well-formed storage key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Number of random base36 characters after the timestamp.
    pub const SUFFIX_LEN: usize = 7;

    /// Mint a new id from the system clock and thread-local RNG.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self::generate_at(millis, &mut rand::thread_rng())
    }

    /// Mint an id for the given timestamp using the supplied RNG.
    pub fn generate_at<R: Rng + ?Sized>(millis: u64, rng: &mut R) -> Self {
        let suffix: String = (0..Self::SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{millis}-{suffix}"))
    }

    /// Validate and wrap an existing identifier.
    ///
    /// Any non-empty string without whitespace or control characters is
    /// accepted, so ids minted by other clients still resolve.
    pub fn parse(value: &str) -> Result<Self, CodecError> {
        if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CodecError::InvalidId(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Millisecond timestamp prefix, if the id follows the generated format.
    pub fn millis(&self) -> Option<u64> {
        self.0.split_once('-').and_then(|(ms, _)| ms.parse().ok())
    }
}

impl FromStr for RecordId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_id_has_time_and_suffix() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = RecordId::generate_at(1_700_000_000_123, &mut rng);

        let (ms, suffix) = id.as_str().split_once('-').unwrap();
        assert_eq!(ms, "1700000000123");
        assert_eq!(suffix.len(), RecordId::SUFFIX_LEN);
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        assert_eq!(id.millis(), Some(1_700_000_000_123));
    }

    #[test]
    fn generated_ids_differ_within_same_millisecond() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = RecordId::generate_at(1, &mut rng);
        let b = RecordId::generate_at(1, &mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn system_clock_id_parses_back() {
        let id = RecordId::generate();
        let parsed: RecordId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
        assert!(id.millis().unwrap() > 0);
    }

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert!(RecordId::parse("").is_err());
        assert!(RecordId::parse("a b").is_err());
        assert!(RecordId::parse("line\nbreak").is_err());
    }

    #[test]
    fn foreign_ids_are_accepted() {
        let id = RecordId::parse("legacy_key").unwrap();
        assert_eq!(id.millis(), None);
        assert_eq!(id.to_string(), "legacy_key");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = RecordId::parse("1-abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1-abc\"");
        assert_eq!(serde_json::from_str::<RecordId>("\"1-abc\"").unwrap(), id);
    }

    #[test]
    fn deserialize_applies_parse_rules() {
        assert!(serde_json::from_str::<RecordId>("\"\"").is_err());
        assert!(serde_json::from_str::<RecordId>("\"a b\"").is_err());
        assert!(serde_json::from_str::<RecordId>("\"tab\\there\"").is_err());
    }
}
