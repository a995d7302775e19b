use serde_json::Value;

use crate::analysis::AnalysisError;
use crate::models::analysis::AnalysisResult;

const REQUIRED_FIELDS: [&str; 4] = ["summary", "strengths", "weaknesses", "jobSuggestions"];

/// Parses the analyzer's full stdout buffer.
///
/// The buffer must hold exactly one JSON object carrying all four result fields as
/// non-empty strings. Anything else is `MalformedOutput`, even after a clean exit.
pub fn parse_analysis_output(stdout: &str) -> Result<AnalysisResult, AnalysisError> {
    let value: Value = serde_json::from_str(stdout.trim())
        .map_err(|e| AnalysisError::MalformedOutput(format!("stdout is not valid JSON: {e}")))?;

    let object = value.as_object().ok_or_else(|| {
        AnalysisError::MalformedOutput("stdout is JSON but not an object".to_string())
    })?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| {
            !object
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|text| !text.trim().is_empty())
        })
        .collect();

    if !missing.is_empty() {
        return Err(AnalysisError::MalformedOutput(format!(
            "missing or empty fields: {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::MalformedOutput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    const VALID: &str = r#"{
        "summary": "Data analyst with four years of SQL and Python.",
        "strengths": "Quantified achievements.",
        "weaknesses": "No summary section.",
        "jobSuggestions": "Business Intelligence Analyst"
    }"#;

    #[test]
    fn test_valid_output() {
        let result = parse_analysis_output(VALID).unwrap();
        assert_eq!(result.job_suggestions, "Business Intelligence Analyst");
    }

    #[test]
    fn test_surrounding_whitespace_is_allowed() {
        let padded = format!("\n\n{VALID}\n");
        assert!(parse_analysis_output(&padded).is_ok());
    }

    #[test]
    fn test_extra_fields_are_dropped() {
        let with_extra = r#"{"summary":"a","strengths":"b","weaknesses":"c","jobSuggestions":"d","score":91}"#;
        let result = parse_analysis_output(with_extra).unwrap();
        let reserialized = serde_json::to_value(&result).unwrap();
        assert!(reserialized.get("score").is_none());
        assert_eq!(reserialized["jobSuggestions"], "d");
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = parse_analysis_output("Resume Summary:\n Experienced engineer").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
    }

    #[test]
    fn test_empty_stdout_is_malformed() {
        assert_eq!(
            parse_analysis_output("").unwrap_err().kind(),
            ErrorKind::MalformedOutput
        );
    }

    #[test]
    fn test_two_objects_are_malformed() {
        let doubled = format!("{VALID}\n{VALID}");
        assert!(parse_analysis_output(&doubled).is_err());
    }

    #[test]
    fn test_array_is_malformed() {
        let err = parse_analysis_output("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("not an object"));
    }

    #[test]
    fn test_missing_field_is_named() {
        let partial = r#"{"summary":"a","strengths":"b","weaknesses":"c"}"#;
        let err = parse_analysis_output(partial).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
        assert!(err.to_string().contains("jobSuggestions"));
    }

    #[test]
    fn test_blank_field_is_malformed() {
        let blank = r#"{"summary":"a","strengths":"  ","weaknesses":"c","jobSuggestions":"d"}"#;
        let err = parse_analysis_output(blank).unwrap_err();
        assert!(err.to_string().contains("strengths"));
    }

    #[test]
    fn test_non_string_field_is_malformed() {
        let numeric = r#"{"summary":"a","strengths":"b","weaknesses":"c","jobSuggestions":42}"#;
        assert!(parse_analysis_output(numeric).is_err());
    }
}
