use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Severity shared by risk factors, the overall assessment and action priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    /// Display order used by the charts and badges.
    pub const DESCENDING: [RiskLevel; 3] = [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(format!("unknown level '{}', expected low, medium or high", s)),
        }
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Treats an explicit `null` list the same as an absent one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub clause: String,
    pub risk: RiskLevel,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub overall_risk: RiskLevel,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub risk_factors: Vec<RiskFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerm {
    pub term: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub importance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub action: String,
    #[serde(default)]
    pub priority: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

/// The analysis proper, as produced by the generation oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub simplified: String,
    pub risk_assessment: RiskAssessment,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub key_terms: Vec<KeyTerm>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub action_items: Vec<ActionItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub timestamp: DateTime<Utc>,
    /// Characters of text actually sent for analysis.
    pub text_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Upload size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_query: Option<bool>,
}

/// Response body of `/analyze` and `/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub analysis: Analysis,
    pub metadata: AnalysisMetadata,
}

/// Per-level tally, always reported high → medium → low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl LevelCounts {
    pub fn tally(levels: impl IntoIterator<Item = RiskLevel>) -> Self {
        levels.into_iter().fold(Self::default(), |mut acc, level| {
            match level {
                RiskLevel::High => acc.high += 1,
                RiskLevel::Medium => acc.medium += 1,
                RiskLevel::Low => acc.low += 1,
            }
            acc
        })
    }

    pub fn as_array(&self) -> [usize; 3] {
        [self.high, self.medium, self.low]
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

impl Analysis {
    pub fn risk_counts(&self) -> LevelCounts {
        LevelCounts::tally(self.risk_assessment.risk_factors.iter().map(|f| f.risk))
    }

    pub fn priority_counts(&self) -> LevelCounts {
        LevelCounts::tally(self.action_items.iter().map(|a| a.priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "simplified": "The contract renews every year.",
            "riskAssessment": {
                "overallRisk": "High",
                "riskFactors": [
                    {"clause": "auto-renewal", "risk": "HIGH", "explanation": "e", "impact": "i"},
                    {"clause": "fees", "risk": "low", "explanation": "e", "impact": "i"}
                ]
            },
            "keyTerms": null,
            "actionItems": [
                {"action": "Set a reminder", "priority": "high", "deadline": "90 days before renewal"},
                {"action": "Read fees"}
            ]
        })
    }

    #[test]
    fn levels_parse_in_any_case_and_serialize_lowercase() {
        let analysis: Analysis = serde_json::from_value(sample()).unwrap();
        assert_eq!(analysis.risk_assessment.overall_risk, RiskLevel::High);
        assert_eq!(analysis.risk_assessment.risk_factors[0].risk, RiskLevel::High);

        let out = serde_json::to_value(&analysis).unwrap();
        assert_eq!(out["riskAssessment"]["overallRisk"], "high");
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let analysis: Analysis = serde_json::from_value(sample()).unwrap();
        assert!(analysis.key_terms.is_empty());
        assert!(analysis.warnings.is_empty());
        assert_eq!(analysis.action_items[1].priority, RiskLevel::Medium);
        assert_eq!(analysis.action_items[1].deadline, None);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let mut value = sample();
        value["riskAssessment"]["overallRisk"] = json!("catastrophic");
        let err = serde_json::from_value::<Analysis>(value).unwrap_err();
        assert!(err.to_string().contains("catastrophic"));
    }

    #[test]
    fn counts_are_ordered_high_medium_low() {
        let analysis: Analysis = serde_json::from_value(sample()).unwrap();
        assert_eq!(analysis.risk_counts().as_array(), [1, 0, 1]);
        assert_eq!(analysis.priority_counts().as_array(), [1, 1, 0]);
        assert_eq!(analysis.priority_counts().total(), 2);
    }

    #[test]
    fn result_flattens_analysis_next_to_metadata() {
        let result = AnalysisResult {
            analysis: serde_json::from_value(sample()).unwrap(),
            metadata: AnalysisMetadata {
                timestamp: Utc::now(),
                text_length: 42,
                file_name: None,
                file_size: None,
                has_query: Some(false),
            },
        };

        let out = serde_json::to_value(&result).unwrap();
        assert_eq!(out["simplified"], "The contract renews every year.");
        assert_eq!(out["metadata"]["textLength"], 42);
        assert_eq!(out["metadata"]["hasQuery"], false);
        assert!(out["metadata"].get("fileName").is_none());
        assert!(out["metadata"]["timestamp"].as_str().unwrap().contains('T'));
    }
}
