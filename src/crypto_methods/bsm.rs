use log::debug;

use crate::binary_encoder::EncodeError;
use crate::curves::CurveName;
use crate::key_resolver::KeyResolver;
use crate::models::{ChargingSession, EccSignature, Measurement, ValueVerification};
use crate::obis_utils::{get_obis_description, obis_to_hex};

use super::{sign_buffered, verify_buffered, CryptoError};

/// BSM-WS36A records carry the textual OBIS code, e.g. `1-0:1.8.0*255`
fn obis_hex(measurement: &Measurement) -> Option<String> {
    let hex = obis_to_hex(&measurement.obis)?;
    debug!("BSM register {} ({})", measurement.obis, get_obis_description(&hex).unwrap_or("unknown register"));
    Some(hex)
}

pub fn verify_measurement(session: &ChargingSession, measurement: &Measurement, value_index: usize, resolver: &KeyResolver) -> ValueVerification {
    verify_buffered(session, measurement, value_index, resolver, CurveName::Secp256r1, obis_hex(measurement))
}

pub fn sign_measurement(session: &ChargingSession, measurement: &Measurement, value_index: usize, private_key_hex: &str) -> Result<EccSignature, CryptoError> {
    let obis = obis_hex(measurement).ok_or(EncodeError::InvalidHex("obis".to_string()))?;
    sign_buffered(session, measurement, value_index, private_key_hex, CurveName::Secp256r1, &obis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_methods::tests::{bsm_registry, bsm_session, registry};
    use crate::models::VerificationResult;
    use crate::test_fixtures::*;

    #[test]
    fn test_valid_fixture_values() {
        let registry = bsm_registry();
        let resolver = KeyResolver::new(&registry);
        let session = bsm_session();
        for i in 0..2 {
            assert_eq!(verify_measurement(&session, &session.measurements[0], i, &resolver).status, VerificationResult::ValidSignature);
        }
    }

    #[test]
    fn test_same_buffer_as_emh_after_obis_conversion() {
        let registry = bsm_registry();
        let resolver = KeyResolver::new(&registry);
        let session = bsm_session();
        let trace = verify_measurement(&session, &session.measurements[0], 0, &resolver).trace.unwrap();
        assert_eq!(trace.buffer.as_deref(), Some(EMH_BUFFER_0));
    }

    #[test]
    fn test_tampered_value() {
        let registry = bsm_registry();
        let resolver = KeyResolver::new(&registry);
        let mut session = bsm_session();
        session.measurements[0].values[0].value = 1001;
        assert_eq!(verify_measurement(&session, &session.measurements[0], 0, &resolver).status, VerificationResult::InvalidSignature);
    }

    #[test]
    fn test_first_key_on_wrong_curve() {
        // the EMH registry lists a secp192r1 key first for this meter
        let registry = registry();
        let resolver = KeyResolver::new(&registry);
        let session = bsm_session();
        assert_eq!(verify_measurement(&session, &session.measurements[0], 0, &resolver).status, VerificationResult::InvalidPublicKey);
    }

    #[test]
    fn test_sign_round_trip() {
        let registry = bsm_registry();
        let resolver = KeyResolver::new(&registry);
        let mut session = bsm_session();
        session.measurements[0].values[1].value = 4242;
        let signature = sign_measurement(&session, &session.measurements[0], 1, BSM_PRIVATE_KEY).unwrap();
        session.measurements[0].values[1].signatures = vec![signature];
        assert_eq!(verify_measurement(&session, &session.measurements[0], 1, &resolver).status, VerificationResult::ValidSignature);

        let signature = sign_measurement(&session, &session.measurements[0], 0, BSM_PRIVATE_KEY).unwrap();
        assert_eq!(signature.r.as_deref(), Some(BSM_R_0));
    }
}
