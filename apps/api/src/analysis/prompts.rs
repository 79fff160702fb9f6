// ATS analysis prompt template.
// All prompts for the analysis module are defined here.

/// ATS evaluation prompt. Replace `{resume_text}` and `{jd}` via `compose_prompt`.
pub const ATS_PROMPT_TEMPLATE: &str = r#"You are an experienced Applicant Tracking System (ATS) and a professional career coach with a deep understanding of the tech industry, including software engineering, data science, and data analysis. Your task is to evaluate a resume against a given job description and provide actionable feedback.

**Instructions:**
1.  **Job Description Match:** Calculate a percentage match between the resume and the job description. This should be a string like "85%".
2.  **Missing Keywords:** Identify and list critical keywords from the job description that are absent in the resume. This should be a list of strings.
3.  **Profile Summary:** Provide a brief summary of the candidate's profile, highlighting strengths and areas for improvement based on the job description.
4.  **Improvement Suggestions:** For the "Missing Keywords" you identified, provide specific, actionable suggestions on how the candidate can incorporate them into their resume. For each suggestion, explain where it might fit (e.g., in a project description, skills section, or summary) and provide an example sentence. This should be a well-structured string or markdown text.

Please provide the output as a single JSON object with the following keys: "JD Match", "MissingKeywords", "Profile Summary", and "ImprovementSuggestions".

**Resume:**
{resume_text}

**Job Description:**
{jd}
"#;

const RESUME_SLOT: &str = "{resume_text}";
const JD_SLOT: &str = "{jd}";

/// Fills the template with the resume text and job description.
///
/// Substitution is a single left-to-right pass over the template, so braces or
/// placeholder names inside the user's text are copied verbatim.
pub fn compose_prompt(resume_text: &str, job_description: &str) -> String {
    let mut prompt =
        String::with_capacity(ATS_PROMPT_TEMPLATE.len() + resume_text.len() + job_description.len());
    let mut rest = ATS_PROMPT_TEMPLATE;

    while let Some(start) = rest.find('{') {
        prompt.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(RESUME_SLOT) {
            prompt.push_str(resume_text);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(JD_SLOT) {
            prompt.push_str(job_description);
            rest = after;
        } else {
            prompt.push('{');
            rest = &tail[1..];
        }
    }
    prompt.push_str(rest);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_inserts_both_inputs_in_order() {
        let prompt = compose_prompt("RESUME BODY", "JD BODY");
        let resume_at = prompt.find("**Resume:**\nRESUME BODY").unwrap();
        let jd_at = prompt.find("**Job Description:**\nJD BODY").unwrap();
        assert!(resume_at < jd_at);
        assert!(!prompt.contains(RESUME_SLOT));
        assert!(!prompt.contains(JD_SLOT));
    }

    #[test]
    fn test_compose_is_deterministic() {
        assert_eq!(compose_prompt("a", "b"), compose_prompt("a", "b"));
    }

    #[test]
    fn test_compose_does_not_reexpand_placeholders_in_input() {
        let prompt = compose_prompt("I wrote {jd} in my resume", "Needs {resume_text} and {x}");
        assert!(prompt.contains("I wrote {jd} in my resume"));
        assert!(prompt.contains("Needs {resume_text} and {x}"));
    }

    #[test]
    fn test_template_requests_all_four_keys() {
        for key in [
            "\"JD Match\"",
            "\"MissingKeywords\"",
            "\"Profile Summary\"",
            "\"ImprovementSuggestions\"",
        ] {
            assert!(ATS_PROMPT_TEMPLATE.contains(key), "template missing {key}");
        }
    }
}
