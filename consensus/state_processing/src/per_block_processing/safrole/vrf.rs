//! Isolates every direct `sp_core::bandersnatch` call behind a narrow,
//! crate-local surface (spec.md §4.4 "Seal verification (Bandersnatch
//! VRF)"). Grounded on the ring-VRF verification patterns shared by the
//! Sassafras pallet and other JAM-adjacent implementations, which verify
//! single-key VRF ownership with `Public::vrf_verify` and ring membership
//! with `VrfSignature::ring_vrf_verify`, deriving VRF output bytes via
//! `pre_outputs[0].make_bytes::<N>(context, input)`.

use parity_scale_codec::Decode;
use sp_core::bandersnatch::{
    ring_vrf::{RingContext, RingVerifierKey},
    vrf::{VrfInput, VrfSignData, VrfSignature},
    Public,
};

/// Ring size for the full-profile validator set. Tiny-profile rings are
/// padded with null keys up to this size by the caller.
pub const RING_SIZE: usize = 1023;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VrfError {
    #[error("malformed bandersnatch public key")]
    MalformedPublicKey,
    #[error("malformed vrf signature")]
    MalformedSignature,
    #[error("vrf signature did not verify")]
    VerificationFailed,
}

fn decode_signature(raw: &[u8]) -> Result<VrfSignature, VrfError> {
    VrfSignature::decode(&mut &raw[..]).map_err(|_| VrfError::MalformedSignature)
}

fn decode_public(raw: &[u8; 32]) -> Result<Public, VrfError> {
    Public::try_from(raw.as_slice()).map_err(|_| VrfError::MalformedPublicKey)
}

/// Verifies a non-anonymous Bandersnatch VRF signature by a known public
/// key over `message` under `context`, returning the 32-byte VRF output
/// (spec.md §4.4 steps 5 and 6: seal and entropy-source verification).
pub fn verify_vrf(
    public_key: &[u8; 32],
    context: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<[u8; 32], VrfError> {
    let public = decode_public(public_key)?;
    let signature = decode_signature(signature)?;
    let input = VrfInput::new(context, message);
    let sign_data = VrfSignData::new_unchecked(context, [input.clone()], None);

    if !public.vrf_verify(&sign_data, &signature) {
        return Err(VrfError::VerificationFailed);
    }

    let output = signature
        .pre_outputs
        .first()
        .ok_or(VrfError::MalformedSignature)?
        .make_bytes::<32>(context, &input);
    Ok(output)
}

/// Verifies an anonymous ring-VRF signature: "some validator in this ring
/// produced this proof" without revealing which one. Used for ticket
/// submissions (spec.md §4.4).
pub fn verify_ring_vrf(
    ring_verifier: &RingVerifierKey,
    context: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<[u8; 32], VrfError> {
    let signature = decode_signature(signature)?;
    let input = VrfInput::new(context, message);
    let sign_data = VrfSignData::new_unchecked(context, [input.clone()], None);

    if !signature.ring_vrf_verify(&sign_data, ring_verifier) {
        return Err(VrfError::VerificationFailed);
    }

    let output = signature
        .pre_outputs
        .first()
        .ok_or(VrfError::MalformedSignature)?
        .make_bytes::<32>(context, &input);
    Ok(output)
}

/// Derives the ring-verifier key (Pedersen commitment over κ, i.e. γ.z)
/// from a ring context and the validator set's Bandersnatch keys.
pub fn ring_verifier_key(
    ring_ctx: &RingContext<RING_SIZE>,
    validator_keys: &[[u8; 32]],
) -> Result<RingVerifierKey, VrfError> {
    let publics = validator_keys
        .iter()
        .map(decode_public)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ring_ctx.verifier_key(&publics))
}
