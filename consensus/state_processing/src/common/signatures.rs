//! Ed25519 verification, isolated behind a narrow surface the same way
//! `safrole::vrf` isolates Bandersnatch calls (spec.md §4.5, §4.6: guarantee
//! and assurance signatures; §4.6 dispute judgements/culprits/faults are all
//! plain Ed25519 too).

use sp_core::{ed25519, Pair};

/// Verifies a non-anonymous Ed25519 signature by a known public key over
/// `message`.
pub fn verify_ed25519(public_key: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> bool {
    let public = ed25519::Public::from_raw(*public_key);
    let signature = ed25519::Signature::from_raw(*signature);
    ed25519::Pair::verify(&signature, message, &public)
}
