/// Sentence every fixes list must open with. The writer treats a user turn
/// starting with it as an order to revise.
pub const REVISE_DIRECTIVE: &str =
    "Revise now. Apply ALL changes below. Output only the revised post text.";

/// Prompt templates for the critic
pub struct CriticPrompts;

impl CriticPrompts {
    /// Build the critique system prompt
    pub fn build_review_prompt() -> String {
        format!(
            r#"You review LinkedIn posts written for early-career developers. Give feedback on the post you are shown.

## Check the post against
1) A strong hook in the first 1-2 lines
2) Beginner-friendly clarity: every piece of jargon explained with an analogy or example
3) Specific insights and concrete examples, not generic advice
4) Skimmable formatting: short lines and whitespace
5) A clear call to action to follow for more
6) 160-220 words, no emojis, authentic tone, no buzzwords, no controversy

## Output format
No scores, no questions, no meta commentary.
Start with exactly:
"{directive}"
Then list ONLY bullet-point fixes, written as edit instructions.
Do NOT include rewritten sentences or paragraphs. Do NOT write the post.

Return only the fixes."#,
            directive = REVISE_DIRECTIVE,
        )
    }
}
