use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::curves::{self, CurveName, PublicKey};
use crate::hash_engine;
use crate::key_resolver::KeyResolver;
use crate::models::{ChargingSession, CryptoTrace, HashAlgorithm, SessionVerificationResult};
use crate::signature_codec::{self, SignatureRs};

use super::{CryptoError, SessionSignatureCheck};

const OCMF_PREFIX: &str = "OCMF|";
const DEFAULT_ALGORITHM: &str = "ECDSA-secp256r1-SHA256";

fn default_algorithm() -> String { DEFAULT_ALGORITHM.to_string() }
fn default_encoding() -> String { "hex".to_string() }

/// Signature section of an OCMF transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OcmfSignature {
    #[serde(rename = "SA", default = "default_algorithm")]
    pub algorithm: String,
    #[serde(rename = "SE", default = "default_encoding")]
    pub encoding: String,
    #[serde(rename = "SM", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "SD")]
    pub data: String,
}

/// The parts of the payload needed to find the key
#[derive(Debug, Clone, Deserialize)]
struct OcmfPayload {
    #[serde(rename = "MS", default)]
    meter_serial: Option<String>,
}

/// `OCMF|<payload>|<signature>`. The payload may itself contain `|`, so the
/// signature is whatever follows the last separator.
pub fn split_transcript(original: &str) -> Result<(&str, OcmfSignature), CryptoError> {
    let body = original.trim().strip_prefix(OCMF_PREFIX)
        .ok_or(CryptoError::InvalidSessionFormat("missing OCMF| prefix".to_string()))?;
    let (payload, signature) = body.rsplit_once('|')
        .ok_or(CryptoError::InvalidSessionFormat("missing signature section".to_string()))?;
    let signature: OcmfSignature = serde_json::from_str(signature)
        .map_err(|e| CryptoError::InvalidSessionFormat(format!("signature section: {e}")))?;
    Ok((payload, signature))
}

/// `ECDSA-<curve>-<hash>` restricted to the algorithms OCMF meters use
pub fn parse_algorithm(algorithm: &str) -> Result<(CurveName, HashAlgorithm), CryptoError> {
    let unsupported = || CryptoError::UnsupportedSignatureAlgorithm(algorithm.to_string());
    let mut parts = algorithm.splitn(3, '-');
    let (scheme, curve, hash) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(curve), Some(hash)) => (scheme, curve, hash),
        _ => return Err(unsupported()),
    };
    if scheme != "ECDSA" {
        return Err(unsupported());
    }
    let curve = match curve.parse::<CurveName>() {
        Ok(c @ (CurveName::Secp192r1 | CurveName::Secp256r1 | CurveName::Secp384r1)) => c,
        _ => return Err(unsupported()),
    };
    match hash.parse::<HashAlgorithm>() {
        Ok(HashAlgorithm::Sha256) => Ok((curve, HashAlgorithm::Sha256)),
        _ => Err(unsupported()),
    }
}

fn decode_signature(signature: &OcmfSignature) -> Result<SignatureRs, CryptoError> {
    let bytes = match signature.encoding.to_lowercase().as_str() {
        "hex" => hex::decode(signature.data.trim()).map_err(|_| signature_codec::CodecError::InvalidEncoding)?,
        "base64" => STANDARD.decode(signature.data.trim()).map_err(|_| signature_codec::CodecError::InvalidEncoding)?,
        other => return Err(CryptoError::InvalidSessionFormat(format!("signature encoding {other}"))),
    };
    Ok(signature_codec::decode_der(&bytes)?)
}

fn status_of(e: &CryptoError) -> SessionVerificationResult {
    match e {
        CryptoError::InvalidSessionFormat(_) => SessionVerificationResult::InvalidSessionFormat,
        CryptoError::UnsupportedSignatureAlgorithm(_) => SessionVerificationResult::UnsupportedSignatureAlgorithm,
        CryptoError::Key(key_error) => SessionVerificationResult::from(key_error),
        CryptoError::Curve(_) => SessionVerificationResult::InvalidPublicKey,
        CryptoError::Codec(_) => SessionVerificationResult::InvalidSignature,
        _ => SessionVerificationResult::InvalidSessionFormat,
    }
}

pub fn verify_session_signature(session: &ChargingSession, resolver: &KeyResolver) -> SessionSignatureCheck {
    match check_transcript(session, resolver) {
        Ok(check) => check,
        Err(e) => {
            warn!("OCMF session {:?}: {e}", session.id);
            SessionSignatureCheck::new(status_of(&e))
        }
    }
}

fn check_transcript(session: &ChargingSession, resolver: &KeyResolver) -> Result<SessionSignatureCheck, CryptoError> {
    let original = session.original.as_deref()
        .ok_or(CryptoError::InvalidSessionFormat("session has no OCMF transcript".to_string()))?;
    let (payload, signature) = split_transcript(original)?;
    let (curve, hash) = parse_algorithm(&signature.algorithm)?;

    let parsed: OcmfPayload = serde_json::from_str(payload)
        .map_err(|e| CryptoError::InvalidSessionFormat(format!("payload: {e}")))?;
    let meter_id = parsed.meter_serial
        .or_else(|| session.measurements.first().map(|m| m.energy_meter_id.clone()))
        .ok_or(CryptoError::InvalidSessionFormat("no meter serial".to_string()))?;

    let key = PublicKey::parse(resolver.meter_key(&meter_id)?)?;
    if key.curve != curve {
        return Err(CryptoError::Curve(curves::CurveError::InvalidPublicKey(format!(
            "meter {meter_id} has a {} key, transcript uses {curve}", key.curve))));
    }

    let digest = hash_engine::hash(payload, hash);
    let mut check = SessionSignatureCheck::new(SessionVerificationResult::InvalidSignature);
    check.public_key = Some(key.to_raw_hex());
    check.hash_value = Some(hex::encode(&digest));

    let rs = match decode_signature(&signature) {
        Ok(rs) => rs.padded(curve.scalar_bytes()),
        Err(e) => {
            debug!("OCMF signature of {meter_id} is malformed: {e}");
            return Ok(check);
        }
    };
    check.trace = Some(CryptoTrace {
        fields: Vec::new(),
        buffer: Some(hex::encode(payload.as_bytes())),
        hash: check.hash_value.clone(),
        public_key: check.public_key.clone(),
        signature_r: Some(rs.r.clone()),
        signature_s: Some(rs.s.clone()),
    });

    if curves::verify_digest(curve, &digest, &rs, &key)? {
        check.status = SessionVerificationResult::ValidSignature;
    }
    Ok(check)
}

/// Build a signed transcript for `payload`, as an OCMF meter would emit it
pub fn sign_payload(payload: &str, curve: CurveName, private_key_hex: &str) -> Result<String, CryptoError> {
    let algorithm = format!("ECDSA-{curve}-SHA256");
    parse_algorithm(&algorithm)?;
    let rs = curves::sign_digest(curve, &hash_engine::hash(payload, HashAlgorithm::Sha256), private_key_hex)?;
    let signature = OcmfSignature {
        algorithm,
        encoding: default_encoding(),
        mime_type: Some("application/x-der".to_string()),
        data: signature_codec::encode_der_hex(&rs)?,
    };
    let signature = serde_json::to_string(&signature)
        .map_err(|e| CryptoError::InvalidSessionFormat(e.to_string()))?;
    Ok(format!("{OCMF_PREFIX}{payload}|{signature}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_methods::tests::registry;
    use crate::test_fixtures::*;

    fn ocmf_session(original: String) -> ChargingSession {
        let mut session = ChargingSession::new();
        session.crypto_method = Some("OCMFv1.0".to_string());
        session.original = Some(original);
        session
    }

    #[test]
    fn test_valid_transcripts() {
        let registry = registry();
        let resolver = KeyResolver::new(&registry);

        let original = format!(r#"OCMF|{OCMF_PAYLOAD}|{{"SD":"{OCMF_SIGNATURE}"}}"#);
        let check = verify_session_signature(&ocmf_session(original), &resolver);
        assert_eq!(check.status, SessionVerificationResult::ValidSignature);
        assert_eq!(check.public_key.as_deref(), Some(GENERIC_256R1_PUBLIC_KEY));
        assert_eq!(check.hash_value, Some(hash_engine::hash_hex(OCMF_PAYLOAD, HashAlgorithm::Sha256)));

        let original = format!(r#"OCMF|{OCMF_PAYLOAD}|{{"SA":"ECDSA-secp256r1-SHA256","SE":"base64","SD":"{OCMF_SIGNATURE_B64}"}}"#);
        assert_eq!(verify_session_signature(&ocmf_session(original), &resolver).status, SessionVerificationResult::ValidSignature);
    }

    #[test]
    fn test_tampered_payload() {
        let registry = registry();
        let resolver = KeyResolver::new(&registry);
        let tampered = OCMF_PAYLOAD.replace("\"RV\":3.5", "\"RV\":35.0");
        assert_ne!(tampered, OCMF_PAYLOAD);
        let original = format!(r#"OCMF|{tampered}|{{"SD":"{OCMF_SIGNATURE}"}}"#);
        assert_eq!(verify_session_signature(&ocmf_session(original), &resolver).status, SessionVerificationResult::InvalidSignature);
    }

    #[test]
    fn test_unsupported_and_malformed() {
        let registry = registry();
        let resolver = KeyResolver::new(&registry);

        let original = format!(r#"OCMF|{OCMF_PAYLOAD}|{{"SA":"ECDSA-brainpool256r1-SHA256","SD":"{OCMF_SIGNATURE}"}}"#);
        assert_eq!(verify_session_signature(&ocmf_session(original), &resolver).status, SessionVerificationResult::UnsupportedSignatureAlgorithm);

        let original = format!(r#"OCMF|{OCMF_PAYLOAD}|{{"SA":"ECDSA-secp256r1-SHA512","SD":"{OCMF_SIGNATURE}"}}"#);
        assert_eq!(verify_session_signature(&ocmf_session(original), &resolver).status, SessionVerificationResult::UnsupportedSignatureAlgorithm);

        let original = format!(r#"OCMF|{{"MS":"OCMF-METER-1"|{{"SD":"{OCMF_SIGNATURE}"}}"#);
        assert_eq!(verify_session_signature(&ocmf_session(original), &resolver).status, SessionVerificationResult::InvalidSessionFormat);

        assert_eq!(verify_session_signature(&ocmf_session("no transcript".to_string()), &resolver).status, SessionVerificationResult::InvalidSessionFormat);
        assert_eq!(verify_session_signature(&ChargingSession::new(), &resolver).status, SessionVerificationResult::InvalidSessionFormat);

        let original = format!(r#"OCMF|{OCMF_PAYLOAD}|{{"SD":"3003020101"}}"#);
        assert_eq!(verify_session_signature(&ocmf_session(original), &resolver).status, SessionVerificationResult::InvalidSignature);
    }

    #[test]
    fn test_unknown_meter() {
        let registry = registry();
        let resolver = KeyResolver::new(&registry);
        let payload = OCMF_PAYLOAD.replace("OCMF-METER-1", "OCMF-METER-2");
        let original = format!(r#"OCMF|{payload}|{{"SD":"{OCMF_SIGNATURE}"}}"#);
        assert_eq!(verify_session_signature(&ocmf_session(original), &resolver).status, SessionVerificationResult::EnergyMeterNotFound);
    }

    #[test]
    fn test_sign_payload_round_trip() {
        let registry = registry();
        let resolver = KeyResolver::new(&registry);
        let original = sign_payload(OCMF_PAYLOAD, CurveName::Secp256r1, GENERIC_PRIVATE_KEY).unwrap();
        assert!(original.ends_with(&format!(r#""SD":"{OCMF_SIGNATURE}"}}"#)));
        assert_eq!(verify_session_signature(&ocmf_session(original), &resolver).status, SessionVerificationResult::ValidSignature);

        assert!(sign_payload(OCMF_PAYLOAD, CurveName::Secp521r1, GENERIC_PRIVATE_KEY).is_err());
    }

    #[test]
    fn test_split_keeps_pipes_in_payload() {
        let (payload, signature) = split_transcript(r#"OCMF|{"ID":"a|b"}|{"SD":"00"}"#).unwrap();
        assert_eq!(payload, r#"{"ID":"a|b"}"#);
        assert_eq!(signature.algorithm, DEFAULT_ALGORITHM);
        assert_eq!(signature.encoding, "hex");
    }
}
