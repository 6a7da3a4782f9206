/// Round-trip-lossless canonical byte encoding (spec.md §6 "Codec
/// collaborator"). Every shape that is hashed or signed inside the core
/// (headers, work reports, extrinsics) implements this trait rather than
/// relying on `serde`, whose output is not a canonical wire format.
///
/// Integer fields are encoded little-endian, per spec.md §3's note on
/// scalar byte order.
pub trait Canonical {
    /// Appends this value's canonical encoding to `buf`.
    fn encode_canonical(&self, buf: &mut Vec<u8>);

    /// Convenience wrapper returning a fresh buffer.
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_canonical(&mut buf);
        buf
    }
}

impl Canonical for [u8; 32] {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self);
    }
}

impl Canonical for u8 {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        buf.push(*self);
    }
}

impl Canonical for u32 {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl Canonical for u64 {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl<T: Canonical> Canonical for [T] {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        // Length-prefixed, matching the rest of the codec's variable-length
        // sequence convention.
        (self.len() as u32).encode_canonical(buf);
        for item in self {
            item.encode_canonical(buf);
        }
    }
}

impl<T: Canonical> Canonical for Vec<T> {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        self.as_slice().encode_canonical(buf)
    }
}

impl<T: Canonical> Canonical for Option<T> {
    fn encode_canonical(&self, buf: &mut Vec<u8>) {
        match self {
            None => buf.push(0),
            Some(value) => {
                buf.push(1);
                value.encode_canonical(buf);
            }
        }
    }
}
