use num_bigint::BigUint;
use spki::der::asn1::BitStringRef;
use spki::der::{AnyRef, Decode, Encode};
use spki::{AlgorithmIdentifierRef, ObjectIdentifier, SubjectPublicKeyInfoRef};

use super::arithmetic::{to_fixed_bytes, AffinePoint};
use super::{CurveError, CurveName};
use crate::models::{KeyEncoding, PublicKeyInfo};
use crate::signature_codec::decode_hex_or_base64;

// ANSI X9.62 id-ecPublicKey
pub const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

const DER_SEQUENCE: u8 = 0x30;

/// A validated point on a named curve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub curve: CurveName,
    pub point: AffinePoint,
}

fn curve_for_coordinates(len: usize) -> Option<CurveName> {
    match len {
        24 => Some(CurveName::Secp192r1),
        28 => Some(CurveName::Secp224k1),
        32 => Some(CurveName::Secp256r1),
        48 => Some(CurveName::Secp384r1),
        66 => Some(CurveName::Secp521r1),
        _ => None,
    }
}

fn invalid(reason: &str) -> CurveError {
    CurveError::InvalidPublicKey(reason.to_string())
}

impl PublicKey {
    /// Parse raw `x || y`, SEC1 uncompressed (`04 || x || y`) or DER
    /// SubjectPublicKeyInfo bytes. A DER key carries its own curve; the
    /// other forms use `curve` or are guessed from their length.
    pub fn from_bytes(curve: Option<CurveName>, bytes: &[u8]) -> Result<Self, CurveError> {
        if bytes.first() == Some(&DER_SEQUENCE) {
            let spki = Self::from_spki(curve, bytes);
            /* a raw x coordinate may start with 0x30 too */
            let raw_length = bytes.len() % 2 == 0 && curve_for_coordinates(bytes.len() / 2).is_some();
            if spki.is_ok() || !raw_length {
                return spki;
            }
        }

        let coordinates = if bytes.len() % 2 == 1 && bytes[0] == 0x04 { &bytes[1..] } else { bytes };
        if coordinates.is_empty() || coordinates.len() % 2 == 1 {
            return Err(invalid("unexpected key length"));
        }
        let half = coordinates.len() / 2;
        let curve = match curve {
            Some(curve) => curve,
            None => curve_for_coordinates(half).ok_or(invalid("unable to infer the curve from the key length"))?,
        };
        if half != curve.field_bytes() {
            return Err(CurveError::InvalidPublicKey(format!("{half} bytes per coordinate do not match {curve}")));
        }

        let point = AffinePoint {
            x: BigUint::from_bytes_be(&coordinates[..half]),
            y: BigUint::from_bytes_be(&coordinates[half..]),
        };
        if !curve.params().is_on_curve(&point) {
            return Err(CurveError::InvalidPublicKey(format!("point is not on {curve}")));
        }
        Ok(PublicKey { curve, point })
    }

    fn from_spki(curve: Option<CurveName>, bytes: &[u8]) -> Result<Self, CurveError> {
        let spki = SubjectPublicKeyInfoRef::from_der(bytes).map_err(|e| CurveError::InvalidPublicKey(e.to_string()))?;
        if spki.algorithm.oid != ID_EC_PUBLIC_KEY {
            return Err(CurveError::InvalidPublicKey(format!("{} is not an EC public key", spki.algorithm.oid)));
        }
        let curve_oid = spki.algorithm.parameters_oid().map_err(|_| invalid("EC key without a named curve"))?;
        let named = CurveName::from_oid(&curve_oid).ok_or(CurveError::UnknownCurve(curve_oid.to_string()))?;
        if let Some(expected) = curve {
            if expected != named {
                return Err(CurveError::InvalidPublicKey(format!("DER key is on {named} but {expected} was declared")));
            }
        }

        match spki.subject_public_key.as_bytes() {
            Some(point) if point.first() == Some(&0x04) => Self::from_bytes(Some(named), point),
            _ => Err(invalid("compressed or malformed point")),
        }
    }

    pub fn from_hex(curve: Option<CurveName>, value: &str) -> Result<Self, CurveError> {
        let bytes = hex::decode(value.trim()).map_err(|_| invalid("key is not hex"))?;
        Self::from_bytes(curve, &bytes)
    }

    /// Parse a registry key entry. An unknown non-empty algorithm name is an error.
    pub fn parse(info: &PublicKeyInfo) -> Result<Self, CurveError> {
        let curve = match (info.algorithm.trim().is_empty(), info.curve()) {
            (true, _) => None,
            (false, Some(curve)) => Some(curve),
            (false, None) => return Err(CurveError::UnknownCurve(info.algorithm.clone())),
        };
        let bytes = match info.encoding {
            KeyEncoding::Hex => hex::decode(info.value.trim()).map_err(|_| invalid("key is not hex"))?,
            KeyEncoding::Der => decode_hex_or_base64(&info.value).map_err(|e| CurveError::InvalidPublicKey(e.to_string()))?,
        };
        Self::from_bytes(curve, &bytes)
    }

    fn coordinates(&self) -> Vec<u8> {
        let len = self.curve.field_bytes();
        let mut out = to_fixed_bytes(&self.point.x, len).unwrap_or_default();
        out.extend(to_fixed_bytes(&self.point.y, len).unwrap_or_default());
        out
    }

    /// x || y
    pub fn to_raw_hex(&self) -> String {
        hex::encode(self.coordinates())
    }

    /// 04 || x || y
    pub fn to_sec1_hex(&self) -> String {
        format!("04{}", self.to_raw_hex())
    }

    /// SubjectPublicKeyInfo with the named curve OID
    pub fn to_der(&self) -> Result<Vec<u8>, CurveError> {
        let der_error = |e: spki::der::Error| CurveError::InvalidPublicKey(e.to_string());

        let curve_oid = self.curve.oid();
        let mut point = vec![0x04];
        point.extend(self.coordinates());

        let spki = SubjectPublicKeyInfoRef {
            algorithm: AlgorithmIdentifierRef { oid: ID_EC_PUBLIC_KEY, parameters: Some(AnyRef::from(&curve_oid)) },
            subject_public_key: BitStringRef::from_bytes(&point).map_err(der_error)?,
        };
        spki.to_der().map_err(der_error)
    }
}
