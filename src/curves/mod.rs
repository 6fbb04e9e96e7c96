//! Named curve catalogue and ECDSA verification.
//!
//! The NIST curves are verified by the RustCrypto `p192`, `p256`, `p384` and
//! `p521` crates. secp224k1 has no such crate and runs on the affine arithmetic
//! in [`arithmetic`], which also derives keys and signs test fixtures.

use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use spki::ObjectIdentifier;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::hash_engine;
use crate::models::HashAlgorithm;
use crate::signature_codec::SignatureRs;

pub mod arithmetic;
pub mod nist;
pub mod params;
pub mod public_key;

pub use arithmetic::{AffinePoint, Point};
pub use params::CurveParams;
pub use public_key::PublicKey;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CurveError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Unknown or unsupported curve: {0}")]
    UnknownCurve(String),
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Unable to produce a signature with the given nonce")]
    SigningFailed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CurveName {
    #[serde(rename = "secp192r1")]
    Secp192r1,
    #[serde(rename = "secp224k1")]
    Secp224k1,
    #[serde(rename = "secp256r1")]
    Secp256r1,
    #[serde(rename = "secp384r1")]
    Secp384r1,
    #[serde(rename = "secp521r1")]
    Secp521r1,
}

// Named curve object identifiers (RFC 5480, SEC 2)
pub const OID_SECP192R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.1");
pub const OID_SECP224K1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.32");
pub const OID_SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
pub const OID_SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
pub const OID_SECP521R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

impl FromStr for CurveName {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "secp192r1" | "prime192v1" | "p-192" | "nistp192" => Ok(CurveName::Secp192r1),
            "secp224k1" => Ok(CurveName::Secp224k1),
            "secp256r1" | "prime256v1" | "p-256" | "nistp256" => Ok(CurveName::Secp256r1),
            "secp384r1" | "p-384" | "nistp384" => Ok(CurveName::Secp384r1),
            "secp521r1" | "p-521" | "nistp521" => Ok(CurveName::Secp521r1),
            _ => Err(CurveError::UnknownCurve(s.to_string())),
        }
    }
}

impl fmt::Display for CurveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CurveName::Secp192r1 => "secp192r1",
            CurveName::Secp224k1 => "secp224k1",
            CurveName::Secp256r1 => "secp256r1",
            CurveName::Secp384r1 => "secp384r1",
            CurveName::Secp521r1 => "secp521r1",
        };
        write!(f, "{name}")
    }
}

impl CurveName {
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            CurveName::Secp192r1 => OID_SECP192R1,
            CurveName::Secp224k1 => OID_SECP224K1,
            CurveName::Secp256r1 => OID_SECP256R1,
            CurveName::Secp384r1 => OID_SECP384R1,
            CurveName::Secp521r1 => OID_SECP521R1,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [CurveName::Secp192r1, CurveName::Secp224k1, CurveName::Secp256r1, CurveName::Secp384r1, CurveName::Secp521r1]
            .into_iter()
            .find(|c| c.oid() == *oid)
    }

    pub fn params(&self) -> &'static CurveParams {
        match self {
            CurveName::Secp192r1 => &*params::SECP192R1,
            CurveName::Secp224k1 => &*params::SECP224K1,
            CurveName::Secp256r1 => &*params::SECP256R1,
            CurveName::Secp384r1 => &*params::SECP384R1,
            CurveName::Secp521r1 => &*params::SECP521R1,
        }
    }

    /// Byte length of the field elements (coordinates)
    pub fn field_bytes(&self) -> usize {
        self.params().field_bytes
    }

    /// Byte length of scalars modulo the group order (r, s, private keys)
    pub fn scalar_bytes(&self) -> usize {
        self.params().scalar_bytes
    }
}

fn parse_scalar(hex_value: &str) -> Option<BigUint> {
    let trimmed = hex_value.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigUint::parse_bytes(trimmed.as_bytes(), 16)
}

fn check_key_curve(curve: CurveName, key: &PublicKey) -> Result<(), CurveError> {
    if key.curve != curve {
        return Err(CurveError::InvalidPublicKey(format!("key is on {} but {} was requested", key.curve, curve)));
    }
    Ok(())
}

fn parse_signature(signature: &SignatureRs) -> Option<(BigUint, BigUint)> {
    match (parse_scalar(&signature.r), parse_scalar(&signature.s)) {
        (Some(r), Some(s)) => Some((r, s)),
        _ => {
            debug!("Signature components are not hex");
            None
        }
    }
}

fn verify_prehash(curve: CurveName, prehash: &[u8], r: &BigUint, s: &BigUint, key: &PublicKey) -> Result<bool, CurveError> {
    match curve {
        CurveName::Secp192r1 => nist::verify_p192(prehash, r, s, &key.point),
        CurveName::Secp256r1 => nist::verify_p256(prehash, r, s, &key.point),
        CurveName::Secp384r1 => nist::verify_p384(prehash, r, s, &key.point),
        CurveName::Secp521r1 => nist::verify_p521(prehash, r, s, &key.point),
        CurveName::Secp224k1 => {
            let params = curve.params();
            Ok(params.verify_scalar(&params.digest_to_scalar(prehash), r, s, &key.point))
        }
    }
}

/// Verify `signature` over `digest`, truncating the digest to the bit length
/// of the group order the way ECDSA prescribes.
///
/// Returns `Ok(false)` for every malformed signature; only key problems are errors.
pub fn verify_digest(curve: CurveName, digest: &[u8], signature: &SignatureRs, key: &PublicKey) -> Result<bool, CurveError> {
    check_key_curve(curve, key)?;
    match parse_signature(signature) {
        Some((r, s)) => verify_prehash(curve, digest, &r, &s, key),
        None => Ok(false),
    }
}

/// Verify with an already reduced integer digest `e`
pub fn verify_scalar(curve: CurveName, e: &BigUint, signature: &SignatureRs, key: &PublicKey) -> Result<bool, CurveError> {
    check_key_curve(curve, key)?;
    let (r, s) = match parse_signature(signature) {
        Some(rs) => rs,
        None => return Ok(false),
    };
    let params = curve.params();
    if curve == CurveName::Secp224k1 {
        return Ok(params.verify_scalar(e, &r, &s, &key.point));
    }
    /* e mod n is below the order, so the field sized encoding is taken as is */
    match arithmetic::to_fixed_bytes(&(e % &params.n), params.field_bytes) {
        Some(prehash) => verify_prehash(curve, &prehash, &r, &s, key),
        None => Ok(false),
    }
}

fn parse_private_key(curve: CurveName, private_key_hex: &str) -> Result<BigUint, CurveError> {
    let d = parse_scalar(private_key_hex).ok_or(CurveError::InvalidPrivateKey)?;
    if d.is_zero() || d >= curve.params().n {
        return Err(CurveError::InvalidPrivateKey);
    }
    Ok(d)
}

pub fn derive_public_key(curve: CurveName, private_key_hex: &str) -> Result<PublicKey, CurveError> {
    let d = parse_private_key(curve, private_key_hex)?;
    let params = curve.params();
    match params.multiply(&d, &params.generator()) {
        Point::Affine(point) => Ok(PublicKey { curve, point }),
        Point::Infinity => Err(CurveError::InvalidPrivateKey),
    }
}

/// Deterministic nonce for fixture signing: SHA-512(d || digest) mod (n - 1) + 1
fn fixture_nonce(params: &CurveParams, d: &BigUint, digest: &[u8]) -> BigUint {
    let mut input = arithmetic::to_fixed_bytes(d, params.scalar_bytes).unwrap_or_default();
    input.extend_from_slice(digest);
    let h = BigUint::from_bytes_be(&hash_engine::hash(&input, HashAlgorithm::Sha512));
    let one = BigUint::from(1u8);
    (h % (&params.n - &one)) + one
}

/// Sign a digest for test fixtures. Not meant for production key handling.
pub fn sign_digest(curve: CurveName, digest: &[u8], private_key_hex: &str) -> Result<SignatureRs, CurveError> {
    let params = curve.params();
    let d = parse_private_key(curve, private_key_hex)?;
    let e = params.digest_to_scalar(digest);
    let k = fixture_nonce(params, &d, digest);
    let (r, s) = params.sign_scalar(&e, &d, &k).ok_or(CurveError::SigningFailed)?;
    Ok(SignatureRs::from_scalars(&r, &s, params.scalar_bytes))
}
