use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info, warn};
use num_bigint::BigUint;

use crate::curves::{self, CurveError, CurveName, PublicKey};
use crate::hash_engine;
use crate::key_resolver::{KeyCandidate, KeyResolver};
use crate::models::{ChargingSession, CryptoTrace, EccSignature, HashAlgorithm, SessionVerificationResult};
use crate::signature_codec::{self, SignatureRs};

use super::{CryptoError, SessionSignatureCheck};

/// Bits dropped from SHA-256 to fit the 225 bit secp224k1 order
const SECP224K1_SHIFT: usize = 31;

/// Hash applied by ChargePoint stations for keys on `curve`
pub fn hash_for_curve(curve: CurveName) -> Option<HashAlgorithm> {
    match curve {
        CurveName::Secp224k1 | CurveName::Secp256r1 => Some(HashAlgorithm::Sha256),
        CurveName::Secp384r1 => Some(HashAlgorithm::Sha384),
        CurveName::Secp521r1 => Some(HashAlgorithm::Sha512),
        CurveName::Secp192r1 => None,
    }
}

enum Attempt {
    Valid,
    Invalid,
    BadKey,
    Unsupported,
}

struct Outcome {
    attempt: Attempt,
    public_key: Option<String>,
    hash_value: Option<String>,
    trace: Option<CryptoTrace>,
}

impl Outcome {
    fn failed(attempt: Attempt) -> Self {
        Outcome { attempt, public_key: None, hash_value: None, trace: None }
    }
}

fn try_candidate(plaintext: &[u8], signature: &SignatureRs, candidate: &KeyCandidate) -> Outcome {
    let key = match PublicKey::parse(candidate.info) {
        Ok(key) => key,
        Err(e) => {
            warn!("Skipping key of {}: {e}", candidate.owner);
            return Outcome::failed(Attempt::BadKey);
        }
    };
    let hash = match hash_for_curve(key.curve) {
        Some(hash) => hash,
        None => {
            debug!("Key of {} is on {}, not used by ChargePoint", candidate.owner, key.curve);
            return Outcome::failed(Attempt::Unsupported);
        }
    };

    let digest = hash_engine::hash(plaintext, hash);
    let rs = signature.padded(key.curve.scalar_bytes());

    let (result, hash_value) = if key.curve == CurveName::Secp224k1 {
        let reduced = hash_engine::shift_reduce(&hex::encode(&digest), SECP224K1_SHIFT).unwrap_or_default();
        let e = BigUint::parse_bytes(reduced.as_bytes(), 16).unwrap_or_default();
        (curves::verify_scalar(key.curve, &e, &rs, &key), reduced)
    } else {
        (curves::verify_digest(key.curve, &digest, &rs, &key), hex::encode(&digest))
    };

    let attempt = match result {
        Ok(true) => Attempt::Valid,
        Ok(false) => Attempt::Invalid,
        Err(e) => {
            warn!("Key of {} rejected: {e}", candidate.owner);
            Attempt::BadKey
        }
    };
    let public_key = key.to_raw_hex();
    Outcome {
        attempt,
        trace: Some(CryptoTrace {
            fields: Vec::new(),
            buffer: Some(hex::encode(plaintext)),
            hash: Some(hash_value.clone()),
            public_key: Some(public_key.clone()),
            signature_r: Some(rs.r),
            signature_s: Some(rs.s),
        }),
        public_key: Some(public_key),
        hash_value: Some(hash_value),
    }
}

fn session_signature(session: &ChargingSession) -> Result<SignatureRs, CryptoError> {
    let signature = session.signature.as_ref()
        .ok_or(CryptoError::Codec(signature_codec::CodecError::MissingComponent("session signature".to_string())))?;
    Ok(SignatureRs::from_ecc(signature)?)
}

pub fn verify_session_signature(session: &ChargingSession, resolver: &KeyResolver) -> SessionSignatureCheck {
    let plaintext = match session.original.as_deref().map(|o| STANDARD.decode(o.trim())) {
        Some(Ok(plaintext)) => plaintext,
        Some(Err(e)) => {
            warn!("ChargePoint session {:?} has an undecodable original: {e}", session.id);
            return SessionSignatureCheck::new(SessionVerificationResult::InvalidSessionFormat);
        }
        None => {
            warn!("ChargePoint session {:?} has no original", session.id);
            return SessionSignatureCheck::new(SessionVerificationResult::InvalidSessionFormat);
        }
    };

    let signature = match session_signature(session) {
        Ok(signature) => signature,
        Err(e) => {
            warn!("ChargePoint session {:?}: {e}", session.id);
            return SessionSignatureCheck::new(SessionVerificationResult::InvalidSignature);
        }
    };

    let candidates = match resolver.session_candidates(session) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("{e}");
            return SessionSignatureCheck::new(SessionVerificationResult::from(&e));
        }
    };

    let mut first_checked: Option<Outcome> = None;
    let mut any_unsupported = false;
    for candidate in &candidates {
        let outcome = try_candidate(&plaintext, &signature, candidate);
        match outcome.attempt {
            Attempt::Valid => {
                info!("ChargePoint session {:?} verified with key of {}", session.id, candidate.owner);
                return SessionSignatureCheck {
                    status: SessionVerificationResult::ValidSignature,
                    public_key: outcome.public_key,
                    hash_value: outcome.hash_value,
                    trace: outcome.trace,
                };
            }
            Attempt::Invalid => {
                if first_checked.is_none() {
                    first_checked = Some(outcome);
                }
            }
            Attempt::Unsupported => any_unsupported = true,
            Attempt::BadKey => {}
        }
    }

    match first_checked {
        Some(outcome) => SessionSignatureCheck {
            status: SessionVerificationResult::InvalidSignature,
            public_key: None,
            hash_value: outcome.hash_value,
            trace: outcome.trace,
        },
        None if any_unsupported => SessionSignatureCheck::new(SessionVerificationResult::UnsupportedSignatureAlgorithm),
        None => SessionSignatureCheck::new(SessionVerificationResult::InvalidPublicKey),
    }
}

/// Sign a session plaintext the way a ChargePoint station does, DER encoded
pub fn sign_session(plaintext: &[u8], curve: CurveName, private_key_hex: &str) -> Result<EccSignature, CryptoError> {
    let hash = hash_for_curve(curve).ok_or(CryptoError::Curve(CurveError::UnknownCurve(curve.to_string())))?;
    /* for secp224k1 the standard digest truncation equals the 31 bit shift */
    let rs = curves::sign_digest(curve, &hash_engine::hash(plaintext, hash), private_key_hex)?;
    Ok(EccSignature::from_der_hex(signature_codec::encode_der_hex(&rs)?))
}
