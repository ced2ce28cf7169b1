//! Shared dispatch context
//!
//! The context is the system prompt plus every attached reference document,
//! concatenated once per dispatch cycle. It is frozen at send time: all N
//! requests of a cycle share the same immutable string, so mid-flight edits
//! to the prompt or documents never leak into an in-progress cycle.

use crate::store::Document;

/// Build the shared context string for one dispatch cycle
///
/// Documents are appended verbatim after the trimmed system prompt, each
/// under a header naming the source file.
///
/// # Examples
///
/// ```
/// use quadchat::session::build_context;
///
/// let context = build_context("Answer briefly.", &[]);
/// assert_eq!(context, "Answer briefly.");
/// ```
pub fn build_context(system_prompt: &str, documents: &[Document]) -> String {
    let mut context = system_prompt.trim().to_string();
    for doc in documents {
        if !context.is_empty() {
            context.push_str("\n\n");
        }
        context.push_str(&format!(
            "--- Reference Document: {} ---\n{}",
            doc.filename, doc.content
        ));
    }
    context
}
