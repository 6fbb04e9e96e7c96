use log::debug;
use num_bigint::BigUint;

use super::arithmetic::{to_fixed_bytes, AffinePoint};
use super::CurveError;

/// 04 || x || y
fn sec1_uncompressed(point: &AffinePoint, field_bytes: usize) -> Result<Vec<u8>, CurveError> {
    let x = to_fixed_bytes(&point.x, field_bytes).ok_or(CurveError::InvalidPublicKey("x coordinate too large".to_string()))?;
    let y = to_fixed_bytes(&point.y, field_bytes).ok_or(CurveError::InvalidPublicKey("y coordinate too large".to_string()))?;
    let mut out = Vec::with_capacity(1 + 2 * field_bytes);
    out.push(0x04);
    out.extend_from_slice(&x);
    out.extend_from_slice(&y);
    Ok(out)
}

/// r || s, `None` when a component is wider than the curve order
fn raw_signature(r: &BigUint, s: &BigUint, scalar_bytes: usize) -> Option<Vec<u8>> {
    let mut out = to_fixed_bytes(r, scalar_bytes)?;
    out.extend_from_slice(&to_fixed_bytes(s, scalar_bytes)?);
    Some(out)
}

/* the verifiers refuse digests shorter than half the field, leading zeros keep the value */
fn left_padded(digest: &[u8], field_bytes: usize) -> Vec<u8> {
    if digest.len() >= field_bytes {
        return digest.to_vec();
    }
    let mut out = vec![0u8; field_bytes - digest.len()];
    out.extend_from_slice(digest);
    out
}

macro_rules! prehash_verifier {
    ($name:ident, $krate:ident, $field_bytes:expr, $label:expr) => {
        pub fn $name(digest: &[u8], r: &BigUint, s: &BigUint, key: &AffinePoint) -> Result<bool, CurveError> {
            use $krate::ecdsa::{signature::hazmat::PrehashVerifier, Signature, VerifyingKey};

            let encoded = sec1_uncompressed(key, $field_bytes)?;
            let public_key = VerifyingKey::from_sec1_bytes(&encoded).map_err(|e| CurveError::InvalidPublicKey(e.to_string()))?;

            let raw = match raw_signature(r, s, $field_bytes) {
                Some(raw) => raw,
                None => return Ok(false),
            };
            let signature = match Signature::from_slice(&raw) {
                Ok(signature) => signature,
                Err(e) => {
                    debug!("{} signature rejected: {e}", $label);
                    return Ok(false);
                }
            };
            Ok(public_key.verify_prehash(&left_padded(digest, $field_bytes), &signature).is_ok())
        }
    };
}

prehash_verifier!(verify_p192, p192, 24, "secp192r1");
prehash_verifier!(verify_p256, p256, 32, "secp256r1");
prehash_verifier!(verify_p384, p384, 48, "secp384r1");
prehash_verifier!(verify_p521, p521, 66, "secp521r1");
