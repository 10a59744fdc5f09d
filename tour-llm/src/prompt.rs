//! Prompt templates for tour character replies.
//!
//! Every prompt is a versioned, testable artifact. Templates use `{key}`
//! placeholders filled by [`render_template`].

use crate::types::GenerationRequest;

/// Version tag of the built-in persona templates.
pub const PERSONA_VERSION: &str = "1.0";

/// Persona (system) half of a character reply prompt.
pub const PERSONA_SYSTEM: &str = r"You are {name}, the {role} on a student counseling program's campus tour.
Your personality: {personality}.
Something people notice about you: you {quirk}.

RULES:
- Stay in character. Never mention that you are an AI or a program.
- Answer in 2-3 short, friendly sentences.
- Speak to a prospective student or parent visiting the campus.
- If the question is off-topic, steer gently back to student support.";

/// Question (user) half of a character reply prompt.
pub const PERSONA_USER: &str = r#"A visitor asks you: "{question}"

Reply as {name} would, in plain text with no lists or headings."#;

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value. Unknown placeholders are
/// left as-is.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// Everything a persona prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PersonaVars<'a> {
    /// Character name.
    pub name: &'a str,
    /// Job title.
    pub role: &'a str,
    /// Short personality description.
    pub personality: &'a str,
    /// Verb phrase ("hums while typing").
    pub quirk: &'a str,
    /// The visitor's question.
    pub question: &'a str,
}

impl PersonaVars<'_> {
    fn as_pairs(&self) -> [(&str, &str); 5] {
        [
            ("name", self.name),
            ("role", self.role),
            ("personality", self.personality),
            ("quirk", self.quirk),
            ("question", self.question.trim()),
        ]
    }
}

/// Render `(system, user)` persona prompts.
#[must_use]
pub fn render_persona(vars: &PersonaVars<'_>) -> (String, String) {
    let pairs = vars.as_pairs();
    (
        render_template(PERSONA_SYSTEM, &pairs),
        render_template(PERSONA_USER, &pairs),
    )
}

/// A ready-to-send request for a persona reply with default sampling.
#[must_use]
pub fn persona_request(vars: &PersonaVars<'_>) -> GenerationRequest {
    let (system, user) = render_persona(vars);
    GenerationRequest::new(system, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn han<'a>(question: &'a str) -> PersonaVars<'a> {
        PersonaVars {
            name: "Ms. Han",
            role: "School Counselor",
            personality: "warm, patient",
            quirk: "keeps peppermints on every desk",
            question,
        }
    }

    #[test]
    fn template_rendering_works() {
        let rendered = render_template(
            "Hello {name}, you are a {role}.",
            &[("name", "Ms. Han"), ("role", "counselor")],
        );
        assert_eq!(rendered, "Hello Ms. Han, you are a counselor.");
    }

    #[test]
    fn template_handles_missing_vars() {
        let rendered = render_template("Hello {name}, {unknown}.", &[("name", "Ms. Han")]);
        assert_eq!(rendered, "Hello Ms. Han, {unknown}.");
    }

    #[test]
    fn persona_fills_every_placeholder() {
        let (system, user) = render_persona(&han("  What is your role?  "));
        for text in [&system, &user] {
            assert!(!text.contains('{'), "unfilled placeholder in: {text}");
        }
        assert!(system.contains("Ms. Han"));
        assert!(system.contains("2-3"));
        assert!(user.contains("\"What is your role?\""));
    }

    #[test]
    fn persona_request_uses_defaults() {
        let req = persona_request(&han("Why does policy matter?"));
        assert_eq!(req.max_tokens, 150);
        assert!(!req.safety.is_empty());
    }
}
