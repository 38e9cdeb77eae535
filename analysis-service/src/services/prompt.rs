//! Prompt construction for the analysis request.

/// Instructions sent ahead of every document.
pub const ANALYSIS_INSTRUCTIONS: &str = r#"You are an expert legal analyst who explains documents to people without legal training.

Analyze the document below and:
1. Rewrite it in plain, simple language a non-lawyer can understand.
2. Identify clauses that carry risk for the reader and rate each one low, medium or high.
3. Give an overall risk rating of low, medium or high.
4. Define the legal or technical terms a reader must understand.
5. List concrete actions the reader should take, with a priority and a deadline when the document implies one.
6. Call out anything unusual, one-sided or potentially harmful as a warning."#;

/// Shape the model must answer with.
pub const RESPONSE_SCHEMA: &str = r#"{
  "simplified": "plain-language summary of the whole document",
  "riskAssessment": {
    "overallRisk": "low | medium | high",
    "riskFactors": [
      {
        "clause": "the clause or section concerned",
        "risk": "low | medium | high",
        "explanation": "why this clause is risky",
        "impact": "what could happen to the reader"
      }
    ]
  },
  "keyTerms": [
    {
      "term": "term as it appears in the document",
      "definition": "simple definition",
      "importance": "why the reader should care"
    }
  ],
  "actionItems": [
    {
      "action": "what the reader should do",
      "priority": "low | medium | high",
      "deadline": "optional deadline or timeframe"
    }
  ],
  "warnings": ["short warning"]
}"#;

/// Build the full prompt for `text`, focused on `query` when one is given.
///
/// Pure and deterministic: identical inputs yield identical prompts.
pub fn build_prompt(text: &str, query: Option<&str>) -> String {
    let query = query.map(str::trim).filter(|q| !q.is_empty());

    let mut prompt = String::with_capacity(
        ANALYSIS_INSTRUCTIONS.len() + RESPONSE_SCHEMA.len() + text.len() + 256,
    );

    prompt.push_str(ANALYSIS_INSTRUCTIONS);
    prompt.push_str("\n\n");

    if let Some(query) = query {
        prompt.push_str("The reader has a specific question. Focus the analysis on it:\n");
        prompt.push_str("QUESTION:\n");
        prompt.push_str(query);
        prompt.push_str("\n\n");
    }

    prompt.push_str("DOCUMENT:\n\"\"\"\n");
    prompt.push_str(text);
    prompt.push_str("\n\"\"\"\n\n");

    prompt.push_str(
        "Respond with a single JSON object and nothing else, using exactly this structure:\n",
    );
    prompt.push_str(RESPONSE_SCHEMA);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENEWAL: &str =
        "This agreement automatically renews unless cancelled 90 days in advance.";

    #[test]
    fn embeds_literal_text_and_schema() {
        let prompt = build_prompt(RENEWAL, None);
        assert!(prompt.contains(RENEWAL));
        assert!(prompt.contains("\"riskAssessment\""));
        assert!(prompt.contains("\"overallRisk\""));
        assert!(!prompt.contains("QUESTION:"));
    }

    #[test]
    fn embeds_query_when_present() {
        let prompt = build_prompt(RENEWAL, Some("Can I cancel early?"));
        assert!(prompt.contains("QUESTION:\nCan I cancel early?"));
        // The question precedes the document so the model reads it first
        assert!(prompt.find("QUESTION:").unwrap() < prompt.find("DOCUMENT:").unwrap());
    }

    #[test]
    fn blank_query_is_ignored() {
        assert_eq!(build_prompt(RENEWAL, Some("   ")), build_prompt(RENEWAL, None));
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(
            build_prompt(RENEWAL, Some("fees")),
            build_prompt(RENEWAL, Some("fees"))
        );
    }
}
