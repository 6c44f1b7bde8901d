//! Instruction template sent to the language model

use crate::error::{Result, VerificationError};

const PREAMBLE: &str = "You are a professional property legal verification AI.

Analyze the following property documents and generate a structured JSON verification report.

Documents Content:
";

const SCHEMA: &str = r#"
Return ONLY valid JSON in this format:

{
  "propertySummary": "string",
  "ownershipTimeline": [
    {
      "year": "string",
      "event": "string",
      "party": "string",
      "details": "string"
    }
  ],
  "risks": [
    {
      "type": "Legal | Financial | Structural | Ownership",
      "severity": "Low | Medium | High",
      "description": "string",
      "recommendation": "string"
    }
  ],
  "riskScore": number,
  "categoryScores": {
    "Legal": number,
    "Financial": number,
    "Structural": number,
    "Ownership": number
  },
  "legalStatus": "string",
  "surveyDetails": "string"
}
"#;

/// Embed the documents text verbatim in the verification instruction
pub fn build_prompt(documents_text: &str) -> Result<String> {
    if documents_text.trim().is_empty() {
        return Err(VerificationError::EmptyInput);
    }

    let capacity = PREAMBLE.len() + documents_text.len() + SCHEMA.len() + 1;
    let mut prompt = String::with_capacity(capacity);
    prompt.push_str(PREAMBLE);
    prompt.push_str(documents_text);
    prompt.push('\n');
    prompt.push_str(SCHEMA);
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_text_verbatim() {
        let text = "Deed 1995\n\nSurvey 2020 {not json}";
        let prompt = build_prompt(text).unwrap();
        assert!(prompt.contains(text));
        assert!(prompt.starts_with("You are a professional property legal verification AI."));
    }

    #[test]
    fn test_prompt_names_every_schema_field() {
        let prompt = build_prompt("x").unwrap();
        for field in [
            "propertySummary",
            "ownershipTimeline",
            "risks",
            "riskScore",
            "categoryScores",
            "legalStatus",
            "surveyDetails",
            "Legal | Financial | Structural | Ownership",
            "Low | Medium | High",
        ] {
            assert!(prompt.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_documents_precede_schema() {
        let prompt = build_prompt("MARKER").unwrap();
        let marker = prompt.find("MARKER").unwrap();
        let schema = prompt.find("Return ONLY valid JSON").unwrap();
        assert!(marker < schema);
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(matches!(build_prompt(""), Err(VerificationError::EmptyInput)));
        assert!(matches!(build_prompt(" \n\t"), Err(VerificationError::EmptyInput)));
    }
}
