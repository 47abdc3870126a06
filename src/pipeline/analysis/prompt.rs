use crate::models::{PatientContext, ResultRow};

pub const ANALYSIS_INSTRUCTIONS: &str = "You are an AI-powered medical assistant analyzing blood test results.

Instructions:
Provide clear and actionable health recommendations based on the test results.
Present the blood test results in a structured breakdown with:
Test Name
Result
Reference Range
Notes (explanation, significance, and possible concerns)
If age, gender, or health conditions are provided, tailor your recommendations accordingly. In your summary, if anything corresponds to the patient's medical history, make sure to mention it.
";

pub const ANALYSIS_OUTPUT_FORMAT: &str = "Expected Output Format:

Summary:
**Summarize key takeaways** in simple language, mentioning:
- Any potential concerns or abnormalities
- Possible causes
- Suggestions for lifestyle changes or further testing

Recommendations:

[Actionable suggestion 1]
[Actionable suggestion 2]
[Etc.]
Blood Test Breakdown:

Test Name\t| Result\t| Reference Range\t| Notes

Ensure your response is clear, concise, and medically informative. If age, gender, or health conditions are provided, tailor your recommendations accordingly. Avoid making definitive diagnoses and always suggest consulting a healthcare provider if needed.";

/// Build the one-shot analysis prompt from extracted rows and optional
/// patient details.
pub fn compose_prompt(rows: &[ResultRow], context: Option<&PatientContext>) -> String {
    let mut prompt = String::from(ANALYSIS_INSTRUCTIONS);
    prompt.push('\n');

    if let Some(ctx) = context.filter(|c| !c.is_empty()) {
        push_patient_block(&mut prompt, ctx);
    }

    prompt.push_str("Blood Test Results:\n");
    push_results_block(&mut prompt, rows);
    prompt.push('\n');

    prompt.push_str(ANALYSIS_OUTPUT_FORMAT);
    prompt
}

fn push_patient_block(prompt: &mut String, ctx: &PatientContext) {
    prompt.push_str("Patient Information:\n");
    if let Some(age) = ctx.age() {
        prompt.push_str(&format!("Patient Age: {age} years\n"));
    }
    if let Some(gender) = ctx.gender() {
        prompt.push_str(&format!("Patient Gender: {gender}\n"));
    }
    if let Some(history) = ctx.history() {
        prompt.push_str(&format!("Patient Medical History: {history}\n"));
    }
    prompt.push('\n');
}

/// One line per row: `name: value units`, plus the range when present.
fn push_results_block(prompt: &mut String, rows: &[ResultRow]) {
    for row in rows {
        prompt.push_str(&format!("{}: {} {}", row.test_name, row.value, row.units));
        if row.has_reference_range() {
            prompt.push_str(&format!(" (Reference Range: {})", row.reference_range));
        }
        prompt.push('\n');
    }
}
