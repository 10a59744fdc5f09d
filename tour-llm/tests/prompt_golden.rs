//! Persona Prompt Golden Set.
//!
//! Curated character/question pairs with strings the rendered prompt must
//! and must not contain. These run offline; nothing here calls a backend.

use tour_llm::client::{chat_body, generative_body};
use tour_llm::prompt::{self, PersonaVars};

/// A golden case for persona prompt rendering.
struct GoldenCase {
    /// Human-readable name.
    name: &'static str,
    /// Prompt inputs.
    vars: PersonaVars<'static>,
    /// Must appear in the combined prompt.
    must_contain: Vec<&'static str>,
    /// Must not appear in the combined prompt.
    must_not_contain: Vec<&'static str>,
}

fn golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            name: "counselor_role_question",
            vars: PersonaVars {
                name: "Ms. Han",
                role: "School Counselor",
                personality: "warm, patient, a little bit of a worrier",
                quirk: "keeps a jar of peppermints on every desk",
                question: "What is your role here?",
            },
            must_contain: vec!["Ms. Han", "School Counselor", "peppermints", "What is your role here?"],
            must_not_contain: vec!["{name}", "{question}"],
        },
        GoldenCase {
            name: "researcher_policy_question",
            vars: PersonaVars {
                name: "Dr. Kwon",
                role: "Education Policy Researcher",
                personality: "precise, thoughtful, quietly funny",
                quirk: "quotes page numbers from memory",
                question: "Why does this policy matter for students?",
            },
            must_contain: vec!["Dr. Kwon", "Policy Researcher", "page numbers", "policy matter"],
            must_not_contain: vec!["{role}", "{personality}"],
        },
        GoldenCase {
            name: "ambassador_stress_question",
            vars: PersonaVars {
                name: "Jiwoo",
                role: "Student Ambassador",
                personality: "cheerful, chatty",
                quirk: "breaks into a little dance when excited",
                question: "How can students manage exam stress?",
            },
            must_contain: vec!["Jiwoo", "little dance", "exam stress"],
            must_not_contain: vec!["{quirk}"],
        },
        GoldenCase {
            name: "question_is_trimmed",
            vars: PersonaVars {
                name: "Ms. Lee",
                role: "Data Analyst",
                personality: "calm, methodical",
                quirk: "names her spreadsheets after constellations",
                question: "   What statistics do you track?\n",
            },
            must_contain: vec!["\"What statistics do you track?\""],
            must_not_contain: vec!["\"   What", "?\n\""],
        },
    ]
}

#[test]
fn golden_prompts_render_without_unresolved_vars() {
    for case in golden_cases() {
        let (system, user) = prompt::render_persona(&case.vars);
        let rendered = format!("{system}\n\n{user}");

        for needle in &case.must_contain {
            assert!(
                rendered.contains(needle),
                "Golden case '{}': rendered prompt must contain '{}' but doesn't.\nRendered:\n{}",
                case.name,
                needle,
                rendered
            );
        }
        for needle in &case.must_not_contain {
            assert!(
                !rendered.contains(needle),
                "Golden case '{}': rendered prompt must NOT contain '{}' but does.\nRendered:\n{}",
                case.name,
                needle,
                rendered
            );
        }
    }
}

#[test]
fn system_prompt_establishes_identity_and_length() {
    assert!(prompt::PERSONA_SYSTEM.contains("You are {name}"));
    assert!(prompt::PERSONA_SYSTEM.contains("2-3"));
    assert!(prompt::PERSONA_USER.contains("{question}"));
}

#[test]
fn request_bodies_carry_the_rendered_prompt() {
    let case = &golden_cases()[0];
    let request = prompt::persona_request(&case.vars);

    let body = generative_body(&request);
    let text = body["contents"][0]["parts"][0]["text"].as_str().expect("text part");
    assert!(text.contains("Ms. Han"));
    assert!(text.contains("What is your role here?"));

    let chat = chat_body("any-model", &request);
    assert!(chat["messages"][0]["content"].as_str().expect("system").contains("You are Ms. Han"));
}
