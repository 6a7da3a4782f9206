use merkleization::Canonical;

/// The four keys a validator publishes, bundled exactly as they appear in
/// κ/λ/ι (spec.md §3 "validator keys"). Bandersnatch and Ed25519 keys are
/// kept as raw 32-byte material rather than `sp_core` key types directly,
/// so that this crate can be `Serialize`/`Copy`/`Canonical` without pulling
/// `sp_core`'s own (de)serialization conventions into the wire format; call
/// sites that need to hand a key to the VRF machinery convert with
/// `sp_core::bandersnatch::Public::decode` (see `state_processing::safrole::vrf`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ValidatorKeys {
    pub bandersnatch: [u8; 32],
    pub ed25519: [u8; 32],
    #[serde(with = "big_array")]
    pub bls: [u8; 144],
    #[serde(with = "big_array_meta")]
    pub metadata: [u8; 128],
}

impl std::fmt::Debug for ValidatorKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorKeys")
            .field("bandersnatch", &hex::encode(self.bandersnatch))
            .field("ed25519", &hex::encode(self.ed25519))
            .field("bls", &"<144 bytes>")
            .field("metadata", &"<128 bytes>")
            .finish()
    }
}

impl Canonical for ValidatorKeys {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.bandersnatch);
        buf.extend_from_slice(&self.ed25519);
        buf.extend_from_slice(&self.bls);
        buf.extend_from_slice(&self.metadata);
    }
}

impl ValidatorKeys {
    /// The all-zero key set used to pad a validator set that is short of
    /// `V` members, and returned by bootstrap fallback-author waivers
    /// (spec.md §9 open question: see DESIGN.md).
    pub fn null() -> Self {
        ValidatorKeys {
            bandersnatch: [0u8; 32],
            ed25519: [0u8; 32],
            bls: [0u8; 144],
            metadata: [0u8; 128],
        }
    }

    pub fn is_null(&self) -> bool {
        self.bandersnatch == [0u8; 32] && self.ed25519 == [0u8; 32]
    }
}

mod big_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 144], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 144], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 144 bytes"))
    }
}

mod big_array_meta {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 128], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 128], D::Error> {
        let s = String::deserialize(d)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 128 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_key_round_trips_through_json() {
        let keys = ValidatorKeys::null();
        let json = serde_json::to_string(&keys).unwrap();
        let back: ValidatorKeys = serde_json::from_str(&json).unwrap();
        assert!(back.is_null());
    }
}
