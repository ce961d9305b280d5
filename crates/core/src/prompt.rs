//! Extraction prompt construction.
//!
//! The prompt is fixed: an instruction naming the four target fields, a
//! literal example of the expected JSON shape, and the verbatim note text.
//! Structure comes entirely from the model following this instruction; the
//! rest of the pipeline only checks that the output is syntactically JSON.

/// Build the extraction prompt for a single clinical note.
///
/// The note text is appended verbatim, with no length or content validation;
/// an empty note is acceptable.
pub fn extraction_prompt(note: &str) -> String {
    format!(
        "Extract the following information from this doctor's note and return ONLY a valid JSON object:\n\
         - symptoms: list of patient symptoms\n\
         - diagnosis: primary diagnosis or suspected condition\n\
         - medications: list of prescribed medications with dosages\n\
         - follow_up: follow-up instructions or recommendations\n\n\
         Return the output in this exact JSON format:\n\
         {{\"symptoms\": [\"symptom1\", \"symptom2\"], \"diagnosis\": \"diagnosis here\", \"medications\": [\"med1\", \"med2\"], \"follow_up\": \"follow-up instructions\"}}\n\n\
         Doctor's note:\n{note}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_all_four_fields() {
        let prompt = extraction_prompt("Patient has fever.");
        assert!(prompt.contains("- symptoms:"));
        assert!(prompt.contains("- diagnosis:"));
        assert!(prompt.contains("- medications:"));
        assert!(prompt.contains("- follow_up:"));
    }

    #[test]
    fn prompt_includes_json_example() {
        let prompt = extraction_prompt("note");
        assert!(prompt.contains(r#"{"symptoms": ["symptom1", "symptom2"]"#));
        assert!(prompt.contains(r#""follow_up": "follow-up instructions"}"#));
    }

    #[test]
    fn prompt_ends_with_verbatim_note() {
        let note = "Severe cough for 5 days. Fever 101.5F.";
        let prompt = extraction_prompt(note);
        assert!(prompt.ends_with(&format!("Doctor's note:\n{note}")));
    }

    #[test]
    fn empty_note_is_accepted() {
        let prompt = extraction_prompt("");
        assert!(prompt.ends_with("Doctor's note:\n"));
    }
}
