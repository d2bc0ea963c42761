//! Prompt composer: joins retrieved context and renders one of two templates.
//!
//! Composition is pure: the same context and question always produce the
//! same prompt.

use tracing::info;

/// Separator placed between consecutive context chunks.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Template used when at least some context was retrieved.
pub const CONTEXTUAL_TEMPLATE: &str = "
Answer the question based only on the following context:

{context}

---

Answer the question based on the above context: {question}
";

/// Template used when no context is available.
pub const PLAIN_TEMPLATE: &str = "
Answer the question: {question}
";

/// The two prompt shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptTemplate {
    /// Context block followed by the question.
    Contextual,
    /// Question only.
    Plain,
}

impl PromptTemplate {
    /// Picks the template from the joined context text.
    pub fn select(context_text: &str) -> Self {
        if context_text.is_empty() {
            PromptTemplate::Plain
        } else {
            PromptTemplate::Contextual
        }
    }

    /// Raw template text with `{context}` / `{question}` placeholders.
    pub fn text(self) -> &'static str {
        match self {
            PromptTemplate::Contextual => CONTEXTUAL_TEMPLATE,
            PromptTemplate::Plain => PLAIN_TEMPLATE,
        }
    }

    /// Substitutes placeholders in a single pass.
    pub fn render(self, context_text: &str, question: &str) -> String {
        substitute(
            self.text(),
            &[("context", context_text), ("question", question)],
        )
    }
}

/// Joins chunk contents with [`CONTEXT_SEPARATOR`], preserving order.
pub fn join_context<S: AsRef<str>>(chunks: &[S]) -> String {
    chunks
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(CONTEXT_SEPARATOR)
}

/// Builds the final prompt for `question` from ranked context chunks.
///
/// # Example
/// ```
/// use contextor::prompt::compose;
/// let p = compose::<&str>(&[], "What is 2+2?");
/// assert_eq!(p, "\nAnswer the question: What is 2+2?\n");
/// ```
pub fn compose<S: AsRef<str>>(context: &[S], question: &str) -> String {
    let context_text = join_context(context);
    let template = PromptTemplate::select(&context_text);
    match template {
        PromptTemplate::Contextual => info!(chunks = context.len(), "context found"),
        PromptTemplate::Plain => info!("context empty; asking without context"),
    }
    template.render(&context_text, question)
}

/// Replaces `{name}` placeholders from `vars`.
///
/// Inserted values are never re-scanned, so a `{question}` inside the context
/// stays literal. Unknown placeholders and lone braces are copied through.
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = vars.iter().find_map(|(name, value)| {
            tail.strip_prefix(name)
                .and_then(|t| t.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_uses_plain_template() {
        let p = compose::<String>(&[], "What is 2+2?");
        assert_eq!(p, "\nAnswer the question: What is 2+2?\n");
        assert!(!p.contains("following context"));
    }

    #[test]
    fn chunks_join_with_separator_in_order() {
        assert_eq!(join_context(&["A", "B", "C"]), "A\n\n---\n\nB\n\n---\n\nC");
        assert_eq!(join_context::<&str>(&[]), "");
    }

    #[test]
    fn contextual_prompt_layout() {
        let p = compose(&["foo", "bar"], "Q?");
        assert_eq!(
            p,
            "\nAnswer the question based only on the following context:\n\n\
             foo\n\n---\n\nbar\n\n---\n\n\
             Answer the question based on the above context: Q?\n"
        );
    }

    #[test]
    fn single_empty_chunk_counts_as_no_context() {
        assert_eq!(PromptTemplate::select(&join_context(&[""])), PromptTemplate::Plain);
    }

    #[test]
    fn inserted_text_is_not_rescanned() {
        let p = compose(&["see {question} and {context}"], "real?");
        assert!(p.contains("see {question} and {context}"));
        assert!(p.ends_with("context: real?\n"));
    }

    #[test]
    fn stray_braces_survive() {
        assert_eq!(substitute("{a} {x} {", &[("x", "1")]), "{a} 1 {");
    }
}
