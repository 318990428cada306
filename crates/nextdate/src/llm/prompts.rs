//! Prompt templates for case generation.

/// System prompt for providers that take one.
pub fn system_prompt() -> &'static str {
    "You write software test cases for a function that returns the calendar date \
     following a given Gregorian date. You answer with CSV lines only, no prose."
}

/// Build the request for `count` next-date cases.
pub fn generation_prompt(count: usize) -> String {
    format!(
        "Generate {} test cases for the next date problem using robust boundary value \
         analysis and normal test cases. Include both positive (valid) and negative \
         (invalid) cases, focusing on boundary values such as month ends, leap years, \
         minimum and maximum years, and invalid dates. Each test case should be in the \
         format: YYYY-MM-DD,YYYY-MM-DD (input_date,expected_next_date) for valid cases, \
         and YYYY-MM-DD,INVALID for invalid cases. Separate each test case by a newline. \
         Only output the test cases.",
        count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_prompt_mentions_count_and_format() {
        let prompt = generation_prompt(25);
        assert!(prompt.starts_with("Generate 25 test cases"));
        assert!(prompt.contains("YYYY-MM-DD,INVALID"));
        assert!(prompt.contains("leap years"));
    }
}
