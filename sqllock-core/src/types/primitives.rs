use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Width of a claim token in bytes (256 bits).
pub const CLAIM_TOKEN_LEN: usize = 32;

/// Random value proving which acquisition currently owns a lock name.
///
/// A fresh token is drawn for every successful claim, so two claims of the same
/// name never share one.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClaimToken([u8; CLAIM_TOKEN_LEN]);

impl ClaimToken {
    /// Draws a new token from the OS-seeded CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; CLAIM_TOKEN_LEN];
        bytes.copy_from_slice(&nanoid::rngs::default(CLAIM_TOKEN_LEN));
        Self(bytes)
    }

    /// Rebuilds a token read back from the store. Returns `None` on a width mismatch.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; CLAIM_TOKEN_LEN]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; CLAIM_TOKEN_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ClaimToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Tokens are capabilities; keep them out of debug output beyond a short prefix.
impl std::fmt::Debug for ClaimToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClaimToken({}..)", &self.to_hex()[..8])
    }
}

impl Serialize for ClaimToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ClaimToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        Self::from_slice(&bytes).ok_or_else(|| {
            serde::de::Error::invalid_length(bytes.len(), &"32 bytes of hex")
        })
    }
}
