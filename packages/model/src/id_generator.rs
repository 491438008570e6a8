use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque block identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for BlockId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Generate a session seed from a session name using CRC32
pub fn get_session_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for blocks created within one editing session
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    /// Seeded from the CRC32 of `name`; the same name yields the same ids.
    pub fn new(name: &str) -> Self {
        Self::from_seed(get_session_seed(name))
    }

    /// Seeded from a fresh random UUID.
    pub fn random() -> Self {
        Self::from_seed(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> BlockId {
        self.count += 1;
        BlockId(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.count
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_seed_is_stable() {
        let a = get_session_seed("landing-page");
        let b = get_session_seed("landing-page");
        assert_eq!(a, b);
        assert_ne!(a, get_session_seed("pricing-page"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("test");

        let id1 = gen.new_id();
        let id2 = gen.new_id();
        let id3 = gen.new_id();

        assert!(id1.as_str().ends_with("-1"));
        assert!(id2.as_str().ends_with("-2"));
        assert!(id3.as_str().ends_with("-3"));
        assert!(id1.as_str().starts_with(gen.seed()));
        assert_eq!(gen.issued(), 3);
    }

    #[test]
    fn test_random_generators_do_not_collide() {
        let mut a = IdGenerator::random();
        let mut b = IdGenerator::random();
        assert_ne!(a.new_id(), b.new_id());
    }

    #[test]
    fn test_block_id_serializes_as_plain_string() {
        let id = BlockId::from("abc-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-1\"");
    }
}
