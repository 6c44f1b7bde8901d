//! Verification report produced by the language model
//!
//! Field names follow the JSON schema the model is instructed to emit
//! (`propertySummary`, `ownershipTimeline`, ...). The model does not always
//! follow that schema to the letter, so this is a lenient view:
//!
//! - missing top-level fields take their defaults
//! - severities and risk types match case-insensitively and keep unknown labels
//! - scores accept numeric strings
//! - fields outside the schema are kept in [`VerificationResult::extra`]

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// A numeric score as emitted by the model.
///
/// Keeps the original JSON number so a report can be returned exactly as it
/// was received (`10` stays `10`, not `10.0`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Score(Number);

impl Score {
    pub fn value(&self) -> f64 {
        self.0.as_f64().unwrap_or(0.0)
    }
}

impl Default for Score {
    fn default() -> Self {
        Score(0.into())
    }
}

impl From<u32> for Score {
    fn from(value: u32) -> Self {
        Score(value.into())
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(Number),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Score(n)),
            Raw::Text(text) => serde_json::from_str::<Number>(text.trim())
                .map(Score)
                .map_err(|_| de::Error::custom(format!("score is not numeric: {:?}", text))),
        }
    }
}

/// One entry in the ownership history of the property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnershipEvent {
    pub year: String,
    pub event: String,
    pub party: String,
    pub details: String,
}

/// Risk category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskType {
    Legal,
    Financial,
    Structural,
    Ownership,
    /// A label outside the schema, kept as emitted
    Other(String),
}

impl From<String> for RiskType {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "legal" => RiskType::Legal,
            "financial" => RiskType::Financial,
            "structural" => RiskType::Structural,
            "ownership" => RiskType::Ownership,
            _ => RiskType::Other(label),
        }
    }
}

impl From<RiskType> for String {
    fn from(risk_type: RiskType) -> Self {
        match risk_type {
            RiskType::Legal => "Legal".to_string(),
            RiskType::Financial => "Financial".to_string(),
            RiskType::Structural => "Structural".to_string(),
            RiskType::Ownership => "Ownership".to_string(),
            RiskType::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Other(String),
}

impl From<String> for RiskSeverity {
    fn from(label: String) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => RiskSeverity::Low,
            "medium" => RiskSeverity::Medium,
            "high" => RiskSeverity::High,
            _ => RiskSeverity::Other(label),
        }
    }
}

impl From<RiskSeverity> for String {
    fn from(severity: RiskSeverity) -> Self {
        match severity {
            RiskSeverity::Low => "Low".to_string(),
            RiskSeverity::Medium => "Medium".to_string(),
            RiskSeverity::High => "High".to_string(),
            RiskSeverity::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    #[serde(rename = "type")]
    pub risk_type: RiskType,
    pub severity: RiskSeverity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommendation: String,
}

/// Per-category scores, 0-100
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CategoryScores {
    pub legal: Score,
    pub financial: Score,
    pub structural: Score,
    pub ownership: Score,
}

impl CategoryScores {
    /// Score for one of the four schema categories
    pub fn get(&self, risk_type: &RiskType) -> Option<&Score> {
        match risk_type {
            RiskType::Legal => Some(&self.legal),
            RiskType::Financial => Some(&self.financial),
            RiskType::Structural => Some(&self.structural),
            RiskType::Ownership => Some(&self.ownership),
            RiskType::Other(_) => None,
        }
    }
}

/// Structured property verification report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationResult {
    pub property_summary: String,
    pub ownership_timeline: Vec<OwnershipEvent>,
    pub risks: Vec<RiskFactor>,
    /// Overall risk, 0-100
    pub risk_score: Score,
    pub category_scores: CategoryScores,
    pub legal_status: String,
    pub survey_details: String,
    /// Fields the model emitted beyond the schema
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerificationResult {
    /// Typed view of a report object
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        Self::deserialize(&Value::Object(object.clone()))
    }

    pub fn risk_band(&self) -> RiskBand {
        RiskBand::from_score(self.risk_score.value())
    }

    /// Risks of the given severity, in report order
    pub fn risks_with_severity<'a>(
        &'a self,
        severity: &'a RiskSeverity,
    ) -> impl Iterator<Item = &'a RiskFactor> + 'a {
        self.risks.iter().filter(move |r| &r.severity == severity)
    }
}

/// Qualitative band for the overall risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Safe,
    Caution,
    HighRisk,
}

impl RiskBand {
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            RiskBand::Safe
        } else if score < 70.0 {
            RiskBand::Caution
        } else {
            RiskBand::HighRisk
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Safe => "Safe",
            RiskBand::Caution => "Caution",
            RiskBand::HighRisk => "High Risk",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const SAMPLE: &str = r#"{
        "propertySummary": "Single family home on lot 4",
        "ownershipTimeline": [
            {"year": "1995", "event": "Deed recorded", "party": "J. Smith", "details": "Warranty deed"}
        ],
        "risks": [
            {"type": "Legal", "severity": "High", "description": "Open lien", "recommendation": "Obtain release"},
            {"type": "Structural", "severity": "Low", "description": "Old roof", "recommendation": "Inspect"}
        ],
        "riskScore": 72.5,
        "categoryScores": {"Legal": 80, "Financial": 20, "Structural": 35, "Ownership": 10},
        "legalStatus": "Encumbered",
        "surveyDetails": "Boundary survey 2020"
    }"#;

    fn sample() -> VerificationResult {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parses_model_schema() {
        let result = sample();
        assert_eq!(result.ownership_timeline.len(), 1);
        assert_eq!(result.risks[0].risk_type, RiskType::Legal);
        assert_eq!(result.risks[0].severity, RiskSeverity::High);
        assert_eq!(result.category_scores.get(&RiskType::Legal).unwrap().value(), 80.0);
        assert_eq!(result.risk_band(), RiskBand::HighRisk);
        assert!(result.extra.is_empty());
    }

    #[test]
    fn test_integer_scores_serialize_unchanged() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["categoryScores"]["Legal"], serde_json::json!(80));
        assert_eq!(json["riskScore"], serde_json::json!(72.5));
        assert_eq!(json["risks"][1]["type"], "Structural");
    }

    #[test]
    fn test_severity_matches_case_insensitively() {
        let text = SAMPLE.replace("\"High\"", "\"high\"");
        let result: VerificationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(result.risks[0].severity, RiskSeverity::High);
    }

    #[test]
    fn test_unknown_labels_are_kept() {
        let text = SAMPLE
            .replace("\"High\"", "\"Severe\"")
            .replace("\"Legal\", \"severity\"", "\"Zoning\", \"severity\"");
        let result: VerificationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(result.risks[0].severity, RiskSeverity::Other("Severe".into()));
        assert_eq!(result.risks[0].risk_type, RiskType::Other("Zoning".into()));
        assert!(result.category_scores.get(&result.risks[0].risk_type).is_none());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["risks"][0]["severity"], "Severe");
        assert_eq!(json["risks"][0]["type"], "Zoning");
    }

    #[test]
    fn test_string_score_is_accepted() {
        let text = SAMPLE.replace("72.5", "\"45\"");
        let result: VerificationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(result.risk_score.value(), 45.0);
        assert_eq!(result.risk_band(), RiskBand::Caution);
    }

    #[test]
    fn test_non_numeric_score_is_rejected() {
        let text = SAMPLE.replace("72.5", "\"very high\"");
        assert!(serde_json::from_str::<VerificationResult>(&text).is_err());
    }

    #[test]
    fn test_missing_field_takes_default() {
        let text = SAMPLE.replace("\"legalStatus\": \"Encumbered\",", "");
        let result: VerificationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(result.legal_status, "");
        assert_eq!(result.survey_details, "Boundary survey 2020");
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let text = SAMPLE.replace("\"riskScore\"", "\"confidence\": \"high\", \"riskScore\"");
        let result: VerificationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(result.extra["confidence"], "high");

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["confidence"], "high");
    }

    #[test]
    fn test_from_object() {
        let value: Value = serde_json::from_str(SAMPLE).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(VerificationResult::from_object(object).unwrap(), sample());
    }

    #[test]
    fn test_risks_with_severity_filters() {
        let result = sample();
        let low: Vec<_> = result.risks_with_severity(&RiskSeverity::Low).collect();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].description, "Old roof");
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(RiskBand::from_score(29.9).label(), "Safe");
        assert_eq!(RiskBand::from_score(30.0).label(), "Caution");
        assert_eq!(RiskBand::from_score(69.0).label(), "Caution");
        assert_eq!(RiskBand::from_score(70.0).label(), "High Risk");
    }

    proptest! {
        /// Bands are monotonic in the score
        #[test]
        fn band_is_monotonic(a in 0u32..=100, b in 0u32..=100) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let rank = |band: RiskBand| match band {
                RiskBand::Safe => 0,
                RiskBand::Caution => 1,
                RiskBand::HighRisk => 2,
            };
            let lo_rank = rank(RiskBand::from_score(lo as f64));
            prop_assert!(lo_rank <= rank(RiskBand::from_score(hi as f64)));
        }
    }
}
