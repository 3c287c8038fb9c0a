use serde::{Deserialize, Serialize};

/// Knobs that tune how the scheduler ranks owners.
///
/// All fields carry defaults so embedders only spell out what they change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Score used to compare eligible owners; the lowest score is selected.
    pub scoring: ScoringPolicy,
}

/// Fairness score applied to each eligible owner during selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Accumulated time usage multiplied by the timestamp of the owner's last
    /// selection. Owners that have never been credited any time score zero and
    /// win until they accrue usage. Because the timestamp is an absolute clock
    /// reading, scores grow for every owner over the scheduler's lifetime.
    #[default]
    UsageTimesLastSelection,
    /// Accumulated time usage only.
    LeastTimeUsed,
}

impl ScoringPolicy {
    /// Score for an owner with `time_usage` accumulated milliseconds whose
    /// most recent selection started at `last_usage`.
    pub fn score(self, time_usage: f64, last_usage: f64) -> f64 {
        match self {
            ScoringPolicy::UsageTimesLastSelection => time_usage * last_usage,
            ScoringPolicy::LeastTimeUsed => time_usage,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoringPolicy::UsageTimesLastSelection => "usage_times_last_selection",
            ScoringPolicy::LeastTimeUsed => "least_time_used",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scoring_multiplies_usage_by_last_selection() {
        let policy = ScoringPolicy::default();
        assert_eq!(policy, ScoringPolicy::UsageTimesLastSelection);
        assert_eq!(policy.score(50.0, 200.0), 10_000.0);
        assert_eq!(policy.score(0.0, 9_999.0), 0.0);
    }

    #[test]
    fn least_time_used_ignores_timestamp() {
        assert_eq!(ScoringPolicy::LeastTimeUsed.score(50.0, 200.0), 50.0);
    }

    #[test]
    fn policy_uses_snake_case_names() {
        let json = serde_json::to_string(&SchedulerConfig {
            scoring: ScoringPolicy::LeastTimeUsed,
        })
        .unwrap();
        assert_eq!(json, r#"{"scoring":"least_time_used"}"#);

        let parsed: SchedulerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, SchedulerConfig::default());
    }
}
