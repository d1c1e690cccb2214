use serde::Serialize;

use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::types::Configuration;

/// Decode a JSON request body into a configuration.
pub fn decode_configuration(payload: &[u8]) -> SimulationResult<Configuration> {
    serde_json::from_slice(payload).map_err(|e| SimulationError::MalformedInput(e.to_string()))
}

/// Encode a response value as JSON terminated by a newline.
pub fn encode_json<T: Serialize>(value: &T) -> SimulationResult<Vec<u8>> {
    let mut payload =
        serde_json::to_vec(value).map_err(|e| SimulationError::EncodingFailure(e.to_string()))?;
    payload.push(b'\n');
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AggregateResults, Student, TrialResult};
    use serde_json::Value;

    #[test]
    fn test_decode_wire_field_names() {
        let body = br#"{
            "exam_score": 80,
            "other_exam_scores": [70, 90],
            "simulations": 1000,
            "top_n": 1,
            "average": 75,
            "stddev": 10,
            "min": 0,
            "max": 100
        }"#;
        let config = decode_configuration(body).unwrap();

        assert_eq!(config.exam_score, 80.0);
        assert_eq!(config.other_exam_scores, vec![70.0, 90.0]);
        assert_eq!(config.simulations, 1000);
        assert_eq!(config.top_n, 1);
        assert_eq!(config.max, 100.0);
    }

    #[test]
    fn test_missing_competitors_default_to_empty() {
        let body = br#"{"exam_score": 80, "simulations": 5, "top_n": 1,
                        "average": 75, "stddev": 10, "min": 0, "max": 100}"#;
        let config = decode_configuration(body).unwrap();
        assert!(config.other_exam_scores.is_empty());
    }

    #[test]
    fn test_negative_simulations_decode_then_fail_validation() {
        let body = br#"{"exam_score": 80, "simulations": -1, "top_n": 1,
                        "average": 75, "stddev": 10, "min": 0, "max": 100}"#;
        let config = decode_configuration(body).unwrap();
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_malformed_payloads() {
        let payloads: [&[u8]; 4] = [
            b"",
            b"not json",
            br#"{"exam_score": "eighty"}"#,
            br#"{"exam_score": 80, "simulations": 1}"#,
        ];
        for payload in payloads {
            assert!(
                matches!(
                    decode_configuration(payload),
                    Err(SimulationError::MalformedInput(_))
                ),
                "{:?} should be malformed",
                String::from_utf8_lossy(payload)
            );
        }
    }

    #[test]
    fn test_configuration_survives_encode_and_decode() {
        let config = Configuration::new()
            .with_exam_score(83.5)
            .with_other_exam_scores(vec![61.0, 77.25, 90.0])
            .with_top_n(2)
            .with_interview_distribution(70.0, 12.5)
            .with_interview_bounds(10.0, 95.0);

        let payload = encode_json(&config).unwrap();
        assert_eq!(payload.last(), Some(&b'\n'));
        assert_eq!(decode_configuration(&payload).unwrap(), config);
    }

    #[test]
    fn test_results_use_wire_field_names() {
        let trial = TrialResult {
            rankings: vec![Student::new(90.0, 80.0)],
            your_rank: 1,
            total_score: 84.0,
            entered_top_n: true,
            is_first_place: true,
        };
        let results = AggregateResults::from_trials(vec![trial]).unwrap();
        let value: Value = serde_json::from_slice(&encode_json(&results).unwrap()).unwrap();

        for key in [
            "results",
            "success_count",
            "first_place_count",
            "top5_probability",
            "first_place_probability",
        ] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }

        let trial = &value["results"][0];
        for key in ["rankings", "your_rank", "total_score", "entered_top_five", "is_first_place"] {
            assert!(trial.get(key).is_some(), "missing {}", key);
        }

        let student = &trial["rankings"][0];
        for key in ["exam_score", "interview_score", "total_score"] {
            assert!(student.get(key).is_some(), "missing {}", key);
        }
    }
}
