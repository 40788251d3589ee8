//! Prompt Builder
//!
//! Renders a source question into the clone instruction string. Pure
//! function of its inputs: the section markers come from the response
//! schema, the closed answer alphabet from configuration.

use super::schema::ResponseSchema;

/// Build the clone-generation prompt for one source question.
///
/// Enumerates the required section markers in order, the closed answer
/// alphabet, the MathJax formatting rules, and the single-character answer
/// directive.
pub fn build_clone_prompt(body: &str, schema: &ResponseSchema, alphabet: &str) -> String {
    let letters = spell_alphabet(alphabet);
    let choices = format_choice_lines(alphabet);
    let structure = format_structure(schema);

    format!(
        r#"Here is a question in LatexMarkdown format:

{body}

Please perform the following tasks:

1) Analyze the question as if you are a 17-year-old student. Think about why a student might choose each of the wrong answers.

2) Create a similar question with different values and/or context. The new question must follow these strict formatting rules:
   - Use proper LaTeX syntax within MathJax delimiters
   - Use \( ... \) for inline math expressions (ensure proper spacing around delimiters)
   - Use \[ ... \] for standalone/display math equations (on their own line)
   - Do NOT begin with a number (e.g., "9." or "1.")
   - Do NOT begin with introductory text (e.g., "Here is a new question" or "Consider the following")
   - Start directly with the question content (e.g., "What is the value of \(x\)...")
   - Include the multiple choice answers as part of the question text, formatted as:
{choices}
   - Ensure all mathematical expressions are properly formatted with correct LaTeX commands
   - Remove any unnecessary line breaks or spaces
   - Use proper spacing around math delimiters (e.g., "If \( x = 5 \), then..." not "If\(x=5\),then...")

3) Provide an explanation of how to solve the new question, written as if you are a 17-year-old average math student explaining it to a peer. Use simple language and avoid advanced mathematical terms. Follow the same formatting rules for any math expressions in the explanation.

Structure your response as follows:

{structure}

Important: The **Answer:** section must contain only a single letter ({letters}) on its own line, with no quotes, punctuation, or additional text.
"#
    )
}

/// "A, B, C, D, or E"
fn spell_alphabet(alphabet: &str) -> String {
    let letters: Vec<String> = alphabet.chars().map(|c| c.to_string()).collect();
    match letters.len() {
        0 => String::new(),
        1 => letters[0].clone(),
        _ => format!(
            "{}, or {}",
            letters[..letters.len() - 1].join(", "),
            letters[letters.len() - 1]
        ),
    }
}

/// "(A) \(answer\)" lines, one per letter
fn format_choice_lines(alphabet: &str) -> String {
    alphabet
        .chars()
        .map(|c| format!("     ({c}) \\(answer\\)"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The marker skeleton the backend must echo, in declared order
fn format_structure(schema: &ResponseSchema) -> String {
    schema
        .sections
        .iter()
        .map(|section| format!("**{}:**\n\n[Your {} here]", section.label, section.label.to_lowercase()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_body() {
        let schema = ResponseSchema::clone_response();
        let prompt = build_clone_prompt("What is \\(2+2\\)?", &schema, "ABCDE");
        assert!(prompt.contains("What is \\(2+2\\)?"));
    }

    #[test]
    fn test_prompt_lists_markers_in_order() {
        let schema = ResponseSchema::clone_response();
        let prompt = build_clone_prompt("body", &schema, "ABCDE");

        let analysis = prompt.find("**Analysis:**").unwrap();
        let question = prompt.find("**New Question:**").unwrap();
        let answer = prompt.find("**Answer:**").unwrap();
        let explanation = prompt.find("**Explanation:**").unwrap();
        assert!(analysis < question && question < answer && answer < explanation);
    }

    #[test]
    fn test_prompt_spells_out_alphabet() {
        let schema = ResponseSchema::clone_response();
        let prompt = build_clone_prompt("body", &schema, "ABCDE");
        assert!(prompt.contains("A, B, C, D, or E"));
        assert!(prompt.contains("(E) \\(answer\\)"));
    }

    #[test]
    fn test_prompt_is_pure() {
        let schema = ResponseSchema::clone_response();
        let a = build_clone_prompt("body", &schema, "ABCDE");
        let b = build_clone_prompt("body", &schema, "ABCDE");
        assert_eq!(a, b);
    }

    #[test]
    fn test_spell_alphabet_shapes() {
        assert_eq!(spell_alphabet("AB"), "A, or B");
        assert_eq!(spell_alphabet("A"), "A");
        assert_eq!(spell_alphabet(""), "");
    }
}
