//! Drives the crypto methods over a whole charging session.
//!
//! Per value schemes are checked value by value, session schemes once, and
//! every value is then reclassified by its position inside its measurement.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::crypto_methods::{CryptoMethod, SigningScope};
use crate::key_resolver::{KeyResolver, Registry};
use crate::models::{
    ChargeTransparencyRecord, ChargingSession, Measurement, SessionVerification, SessionVerificationResult, ValuePosition,
    ValueVerification, VerificationResult, CTR_CONTEXT,
};

/// Result of a complete charge transparency record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CtrVerification {
    pub status: SessionVerificationResult,
    #[serde(default)]
    pub sessions: Vec<SessionVerification>,
}

pub struct SessionAggregator<'a> {
    resolver: KeyResolver<'a>,
}

fn failed(status: SessionVerificationResult, measurements: Vec<Vec<ValueVerification>>) -> SessionVerification {
    SessionVerification { status, public_key: None, hash_value: None, trace: None, measurements }
}

/* keeps the shape of the session, every value NoOperation */
fn untouched(session: &ChargingSession) -> Vec<Vec<ValueVerification>> {
    session.measurements.iter()
        .map(|m| m.values.iter().map(|_| ValueVerification::new(VerificationResult::NoOperation)).collect())
        .collect()
}

fn classify_all(measurements: &mut [Vec<ValueVerification>]) {
    for results in measurements.iter_mut() {
        let count = results.len();
        for (index, result) in results.iter_mut().enumerate() {
            result.status = result.status.classify(ValuePosition::of(index, count));
        }
    }
}

impl<'a> SessionAggregator<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        SessionAggregator { resolver: KeyResolver::new(registry) }
    }

    #[cfg(feature = "parallel")]
    fn verify_values(&self, method: CryptoMethod, session: &ChargingSession, measurement: &Measurement) -> Vec<ValueVerification> {
        (0..measurement.values.len()).into_par_iter()
            .map(|i| method.verify_measurement(session, measurement, i, &self.resolver))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn verify_values(&self, method: CryptoMethod, session: &ChargingSession, measurement: &Measurement) -> Vec<ValueVerification> {
        (0..measurement.values.len())
            .map(|i| method.verify_measurement(session, measurement, i, &self.resolver))
            .collect()
    }

    /// Verify every value of `session` and derive the session verdict.
    /// The session itself is not modified, see [`SessionAggregator::verify_and_apply`].
    pub fn verify_charging_session(&self, session: &ChargingSession) -> SessionVerification {
        if session.measurements.is_empty() {
            warn!("Session {:?} has no measurements", session.id);
            return failed(SessionVerificationResult::InvalidSessionFormat, Vec::new());
        }

        let method = match session.crypto_method.as_deref().and_then(CryptoMethod::from_identifier) {
            Some(method) => method,
            None => {
                warn!("Session {:?} uses unknown crypto method {:?}", session.id, session.crypto_method);
                return failed(SessionVerificationResult::UnknownSessionFormat, untouched(session));
            }
        };

        if session.measurements.iter().any(|m| m.values.len() < 2) {
            warn!("Session {:?} needs a start and a stop value per measurement", session.id);
            return failed(SessionVerificationResult::AtLeastTwoMeasurementsRequired, untouched(session));
        }

        let mut verification = match method.signing_scope() {
            SigningScope::PerValue => {
                let measurements: Vec<Vec<ValueVerification>> = session.measurements.iter()
                    .map(|m| self.verify_values(method, session, m))
                    .collect();
                let all_valid = measurements.iter().flatten().all(|v| v.status == VerificationResult::ValidSignature);
                let public_key = measurements.iter().flatten()
                    .find_map(|v| v.trace.as_ref().and_then(|t| t.public_key.clone()));
                SessionVerification {
                    status: if all_valid { SessionVerificationResult::ValidSignature } else { SessionVerificationResult::InvalidSignature },
                    public_key,
                    hash_value: None,
                    trace: None,
                    measurements,
                }
            }
            SigningScope::PerSession => {
                let check = method.verify_session_signature(session, &self.resolver);
                let stamp = VerificationResult::from(check.status);
                let measurements = session.measurements.iter()
                    .map(|m| m.values.iter().map(|_| ValueVerification::new(stamp)).collect())
                    .collect();
                SessionVerification {
                    status: check.status,
                    public_key: check.public_key,
                    hash_value: check.hash_value,
                    trace: check.trace,
                    measurements,
                }
            }
        };

        classify_all(&mut verification.measurements);
        info!("Session {:?} ({}): {:?}", session.id, method.identifier(), verification.status);
        verification
    }

    /// Verify and write the results back into the session
    pub fn verify_and_apply(&self, session: &mut ChargingSession) -> SessionVerificationResult {
        let verification = self.verify_charging_session(session);
        session.apply_verification(&verification);
        verification.status
    }

    pub fn verify_ctr(&self, ctr: &ChargeTransparencyRecord) -> CtrVerification {
        if ctr.context.trim() != CTR_CONTEXT {
            warn!("Unknown CTR context {}", ctr.context);
            return CtrVerification { status: SessionVerificationResult::UnknownCtrFormat, sessions: Vec::new() };
        }
        if ctr.charging_sessions.is_empty() {
            warn!("CTR without charging sessions");
            return CtrVerification { status: SessionVerificationResult::InvalidSessionFormat, sessions: Vec::new() };
        }

        let sessions: Vec<SessionVerification> = ctr.charging_sessions.iter()
            .map(|s| self.verify_charging_session(s))
            .collect();
        let status = sessions.iter()
            .map(|s| s.status)
            .find(|s| *s != SessionVerificationResult::ValidSignature)
            .unwrap_or(SessionVerificationResult::ValidSignature);
        debug!("CTR with {} sessions: {:?}", sessions.len(), status);
        CtrVerification { status, sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_methods::tests::{bsm_registry, bsm_session, emh_session, registry};
    use crate::models::EccSignature;
    use crate::test_fixtures::*;

    fn statuses(verification: &SessionVerification) -> Vec<VerificationResult> {
        verification.measurements[0].iter().map(|v| v.status).collect()
    }

    #[test]
    fn test_emh_session_classification() {
        let registry = registry();
        let aggregator = SessionAggregator::new(&registry);
        let result = aggregator.verify_charging_session(&emh_session());
        assert_eq!(result.status, SessionVerificationResult::ValidSignature);
        assert_eq!(statuses(&result), vec![
            VerificationResult::ValidStartValue,
            VerificationResult::ValidIntermediateValue,
            VerificationResult::ValidStopValue,
        ]);
        assert_eq!(result.public_key.as_deref(), Some(EMH_PUBLIC_KEY));
    }

    #[test]
    fn test_bsm_session_two_values() {
        let registry = bsm_registry();
        let aggregator = SessionAggregator::new(&registry);
        let result = aggregator.verify_charging_session(&bsm_session());
        assert_eq!(result.status, SessionVerificationResult::ValidSignature);
        assert_eq!(statuses(&result), vec![VerificationResult::ValidStartValue, VerificationResult::ValidStopValue]);
    }

    #[test]
    fn test_tampered_intermediate_value() {
        let registry = registry();
        let aggregator = SessionAggregator::new(&registry);
        let mut session = emh_session();
        session.measurements[0].values[1].value += 1;
        let result = aggregator.verify_charging_session(&session);
        assert_eq!(result.status, SessionVerificationResult::InvalidSignature);
        assert_eq!(statuses(&result), vec![
            VerificationResult::ValidStartValue,
            VerificationResult::InvalidIntermediateValue,
            VerificationResult::ValidStopValue,
        ]);
    }

    #[test]
    fn test_unknown_meter_kept_unclassified() {
        let registry = registry();
        let aggregator = SessionAggregator::new(&registry);
        let mut session = emh_session();
        session.measurements[0].energy_meter_id = "0A01454D4800007F9F3E".to_string();
        let result = aggregator.verify_charging_session(&session);
        assert_eq!(result.status, SessionVerificationResult::InvalidSignature);
        assert!(statuses(&result).iter().all(|s| *s == VerificationResult::EnergyMeterNotFound));
    }

    #[test]
    fn test_malformed_sessions() {
        let registry = registry();
        let aggregator = SessionAggregator::new(&registry);

        let mut session = emh_session();
        session.measurements.clear();
        let result = aggregator.verify_charging_session(&session);
        assert_eq!(result.status, SessionVerificationResult::InvalidSessionFormat);
        assert!(result.measurements.is_empty());

        let mut session = emh_session();
        session.measurements[0].values.truncate(1);
        let result = aggregator.verify_charging_session(&session);
        assert_eq!(result.status, SessionVerificationResult::AtLeastTwoMeasurementsRequired);
        assert_eq!(statuses(&result), vec![VerificationResult::NoOperation]);

        let mut session = emh_session();
        session.crypto_method = Some("EDL40".to_string());
        let result = aggregator.verify_charging_session(&session);
        assert_eq!(result.status, SessionVerificationResult::UnknownSessionFormat);
        assert_eq!(result.measurements[0].len(), 3);

        let mut session = emh_session();
        session.crypto_method = None;
        assert_eq!(aggregator.verify_charging_session(&session).status, SessionVerificationResult::UnknownSessionFormat);
    }

    fn chargepoint_session(signature: &str) -> ChargingSession {
        let mut session = emh_session();
        session.crypto_method = Some("ChargePointCrypt01".to_string());
        session.evse_id = Some("US*CPI*E1234*1".to_string());
        session.original = Some(CP_ORIGINAL.to_string());
        session.signature = Some(EccSignature::from_der_hex(signature.to_string()));
        session
    }

    #[test]
    fn test_session_scheme_stamps_values() {
        let registry = registry();
        let aggregator = SessionAggregator::new(&registry);

        let result = aggregator.verify_charging_session(&chargepoint_session(CP_224K1_SIGNATURE));
        assert_eq!(result.status, SessionVerificationResult::ValidSignature);
        assert!(result.public_key.is_some());
        assert_eq!(statuses(&result), vec![
            VerificationResult::ValidStartValue,
            VerificationResult::ValidIntermediateValue,
            VerificationResult::ValidStopValue,
        ]);

        let result = aggregator.verify_charging_session(&chargepoint_session(CP_256R1_SIGNATURE));
        assert_eq!(result.status, SessionVerificationResult::InvalidSignature);
        assert_eq!(statuses(&result)[0], VerificationResult::InvalidStartValue);

        let mut session = chargepoint_session(CP_224K1_SIGNATURE);
        session.original = None;
        let result = aggregator.verify_charging_session(&session);
        assert_eq!(result.status, SessionVerificationResult::InvalidSessionFormat);
        assert_eq!(statuses(&result), vec![
            VerificationResult::StartValue,
            VerificationResult::IntermediateValue,
            VerificationResult::StopValue,
        ]);
    }

    #[test]
    fn test_verify_and_apply() {
        let registry = registry();
        let aggregator = SessionAggregator::new(&registry);
        let mut session = emh_session();
        assert_eq!(aggregator.verify_and_apply(&mut session), SessionVerificationResult::ValidSignature);
        assert_eq!(session.verification_result, Some(SessionVerificationResult::ValidSignature));
        let last = session.measurements[0].values[2].result.as_ref().unwrap();
        assert_eq!(last.status, VerificationResult::ValidStopValue);
    }

    #[test]
    fn test_ctr() {
        let registry = registry();
        let aggregator = SessionAggregator::new(&registry);

        let mut ctr = ChargeTransparencyRecord { context: CTR_CONTEXT.to_string(), charging_sessions: vec![emh_session()] };
        let result = aggregator.verify_ctr(&ctr);
        assert_eq!(result.status, SessionVerificationResult::ValidSignature);
        assert_eq!(result.sessions.len(), 1);

        let mut broken = emh_session();
        broken.measurements[0].values[0].value = 1;
        ctr.charging_sessions.push(broken);
        assert_eq!(aggregator.verify_ctr(&ctr).status, SessionVerificationResult::InvalidSignature);

        ctr.context = "https://open.charging.cloud/contexts/SessionSignatureFormats/EMHCrypt01+json".to_string();
        let result = aggregator.verify_ctr(&ctr);
        assert_eq!(result.status, SessionVerificationResult::UnknownCtrFormat);
        assert!(result.sessions.is_empty());

        ctr.context = CTR_CONTEXT.to_string();
        ctr.charging_sessions.clear();
        assert_eq!(aggregator.verify_ctr(&ctr).status, SessionVerificationResult::InvalidSessionFormat);
    }
}
