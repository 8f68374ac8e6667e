//! Prompt templates, one per capability. Placeholders are `{name}` and are
//! filled by [`render`].

/// TL;DR of `{text}`
pub const SUMMARISE: &str = "\
Summarise the following documentation into a concise TL;DR with bullet points.

{text}";

/// Starter README for a repository without one
pub const GENERATE_STARTER: &str = "\
You are Docs' Doc. This repository has no README. Write a complete starter README \
for it based on the code files and commits in the context: project purpose, \
installation, usage, project structure and contribution notes. Keep it short and actionable. \
{tone}

Context (JSON):
{context}";

/// Improved README plus an "Updates Added" list
pub const GENERATE_UPDATE: &str = "\
You are Docs' Doc. Rewrite the repository's existing README with improvements applied \
inline, using the code files and recent commits in the context to correct or extend it. \
Keep the author's structure where it still fits. After the README, append a section \
titled \"Updates Added\" with a bullet list of every change you made. {tone}

Context (JSON):
{context}";

/// Docs-versus-code drift report
pub const DRIFT: &str = "\
Compare README/docs with recent commits and code. Identify outdated or risky sections \
and propose updates. Keep code snippets minimal.

Context (JSON):
{context}";

/// Translation into `{language}` that keeps code blocks
pub const TRANSLATE: &str = "\
Translate the documentation to {language}. Keep code blocks/snippets unchanged.

{text}";

/// Question answering over the repository context
pub const ANSWER: &str = "\
Answer the user's question about the repository using the provided context. \
If unsure, say so instead of guessing.

Question: {question}

Context (JSON):
{context}";

/// `{tone}` when emoji are on
pub const TONE_EMOJI: &str = "Use emoji in headings and bullet points to keep the tone friendly.";

/// `{tone}` when emoji are off
pub const TONE_PLAIN: &str = "Do not use emoji; keep the tone plain and professional.";

/// Fills `{name}` placeholders in one pass
///
/// Substituted values are never scanned again, so text containing braces
/// passes through verbatim. Unknown placeholders are left as they are.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let replacement = tail[1..].find('}').and_then(|end| {
            let name = &tail[1..1 + end];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end + 2))
        });
        match replacement {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
