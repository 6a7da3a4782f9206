use merkleization::Canonical;
use safe_arith::{ArithError, SafeArith};
use std::fmt;

macro_rules! checked_integer_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            serde::Serialize, serde::Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            pub const fn new(n: u64) -> Self {
                $name(n)
            }

            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                $name(n)
            }
        }

        impl SafeArith<u64> for $name {
            const ZERO: Self = $name(0);
            const ONE: Self = $name(1);

            fn safe_add(&self, other: u64) -> Result<Self, ArithError> {
                self.0.safe_add(other).map($name)
            }
            fn safe_sub(&self, other: u64) -> Result<Self, ArithError> {
                self.0.safe_sub(other).map($name)
            }
            fn safe_mul(&self, other: u64) -> Result<Self, ArithError> {
                self.0.safe_mul(other).map($name)
            }
            fn safe_div(&self, other: u64) -> Result<Self, ArithError> {
                self.0.safe_div(other).map($name)
            }
            fn safe_rem(&self, other: u64) -> Result<Self, ArithError> {
                self.0.safe_rem(other).map($name)
            }
            fn safe_shl(&self, other: u32) -> Result<Self, ArithError> {
                self.0.safe_shl(other).map($name)
            }
            fn safe_shr(&self, other: u32) -> Result<Self, ArithError> {
                self.0.safe_shr(other).map($name)
            }
        }

        impl Canonical for $name {
            fn encode_canonical(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.0.to_le_bytes());
            }
        }
    };
}

checked_integer_newtype!(Slot);
checked_integer_newtype!(Epoch);

impl Slot {
    /// `⌊s/E⌋` (spec.md §4.2).
    pub fn epoch(&self, epoch_length: u64) -> Result<Epoch, ArithError> {
        self.safe_div(epoch_length).map(|Slot(n)| Epoch(n))
    }

    /// `s mod E` (spec.md §4.2).
    pub fn slot_in_epoch(&self, epoch_length: u64) -> Result<u32, ArithError> {
        self.safe_rem(epoch_length).map(|s| s.0 as u32)
    }
}

impl Epoch {
    pub fn start_slot(&self, epoch_length: u64) -> Result<Slot, ArithError> {
        self.0.safe_mul(epoch_length).map(Slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_arithmetic() {
        let slot = Slot(25);
        assert_eq!(slot.epoch(12).unwrap(), Epoch(2));
        assert_eq!(slot.slot_in_epoch(12).unwrap(), 1);
    }

    #[test]
    fn overflow_is_caught() {
        let slot = Slot(u64::MAX);
        assert!(slot.safe_add(1).is_err());
    }
}
