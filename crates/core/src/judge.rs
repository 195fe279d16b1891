//! Conversational-quality judge abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::JudgeError;

/// One scored dimension as returned by the judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    pub name: String,
    pub score: i64,
    pub analysis: String,
}

/// The judge's verdict over a conversation transcript.
///
/// Wire format is camelCase JSON, e.g.:
/// `{"dynamicScore": 45, "dimensions": [...], "suggestions": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeVerdict {
    pub dynamic_score: i64,
    pub dimensions: Vec<DimensionScore>,
    pub suggestions: Vec<String>,
}

impl JudgeVerdict {
    /// Check structural invariants: exactly three dimensions, each
    /// scored in [0, 20], and a dynamic score in [0, 60].
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), JudgeError> {
        if self.dimensions.len() != 3 {
            return Err(JudgeError::WrongDimensionCount(self.dimensions.len()));
        }
        for dim in &self.dimensions {
            if !(0..=20).contains(&dim.score) {
                return Err(JudgeError::DimensionOutOfRange {
                    name: dim.name.clone(),
                    score: dim.score,
                });
            }
        }
        if !(0..=60).contains(&self.dynamic_score) {
            return Err(JudgeError::DynamicScoreOutOfRange(self.dynamic_score));
        }
        Ok(())
    }
}

/// Evaluates a conversation transcript against the agent configuration.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Produce a validated verdict for the given configuration summary
    /// and transcript.
    async fn judge(
        &self,
        config_summary: &str,
        transcript: &str,
    ) -> Result<JudgeVerdict, JudgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(dynamic: i64, scores: &[i64]) -> JudgeVerdict {
        JudgeVerdict {
            dynamic_score: dynamic,
            dimensions: scores
                .iter()
                .map(|s| DimensionScore {
                    name: "维度".into(),
                    score: *s,
                    analysis: String::new(),
                })
                .collect(),
            suggestions: Vec::new(),
        }
    }

    #[test]
    fn valid_verdict_passes() {
        assert!(verdict(45, &[15, 15, 15]).validate().is_ok());
        assert!(verdict(0, &[0, 0, 0]).validate().is_ok());
        assert!(verdict(60, &[20, 20, 20]).validate().is_ok());
    }

    #[test]
    fn wrong_dimension_count_rejected() {
        let err = verdict(30, &[10, 10]).validate().unwrap_err();
        assert!(matches!(err, JudgeError::WrongDimensionCount(2)));
    }

    #[test]
    fn dimension_out_of_range_rejected() {
        let err = verdict(30, &[10, 25, 10]).validate().unwrap_err();
        assert!(matches!(err, JudgeError::DimensionOutOfRange { score: 25, .. }));
    }

    #[test]
    fn dynamic_score_out_of_range_rejected() {
        let err = verdict(75, &[20, 20, 20]).validate().unwrap_err();
        assert!(matches!(err, JudgeError::DynamicScoreOutOfRange(75)));
    }

    #[test]
    fn camel_case_wire_format() {
        let json = r#"{"dynamicScore": 42, "dimensions": [], "suggestions": ["多用数据"]}"#;
        let verdict: JudgeVerdict = serde_json::from_str(json).unwrap();
        assert_eq!(verdict.dynamic_score, 42);
        assert_eq!(verdict.suggestions.len(), 1);
    }
}
