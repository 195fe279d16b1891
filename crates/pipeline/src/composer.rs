//! Prompt composition: merge scoped instructions, the assembled context
//! bundle, and the user utterance into one generation prompt.

use crate::assembler::ContextBundle;

/// Fixed closing directive establishing the reasoning/answer protocol.
///
/// Wording must stay identical across turns; the stream parser's tag
/// assumptions depend on it.
pub const CLOSING_DIRECTIVE: &str =
    "**Instruction:** 1. Think in <thinking> tags. 2. Final response outside tags.";

/// Compose the four-part generation prompt.
///
/// Parts, in order: scoped (or global) instructions, the delimited
/// pretty-printed context bundle, the literal user utterance, and the
/// fixed closing directive.
pub fn compose_prompt(instructions: &str, bundle: &ContextBundle, utterance: &str) -> String {
    let context_json =
        serde_json::to_string_pretty(bundle).unwrap_or_else(|_| "{}".to_string());
    format!(
        "\n{instructions}\n\n\
---\n\
### SOP EXECUTED CONTEXT (Silently injected by Platform)\n\
{context_json}\n\n\
---\n\
### USER INPUT\n\
{utterance}\n\n\
{CLOSING_DIRECTIVE}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn bundle() -> ContextBundle {
        ContextBundle {
            task: "PRODUCT_RECOMMENDATION".to_string(),
            data: json!({"risk_grade": "A2"}),
            knowledge: Value::Null,
        }
    }

    #[test]
    fn prompt_has_four_parts_in_order() {
        let prompt = compose_prompt("你是一名理财顾问。", &bundle(), "推荐理财");
        let instructions_at = prompt.find("你是一名理财顾问。").unwrap();
        let context_at = prompt.find("SOP EXECUTED CONTEXT").unwrap();
        let input_at = prompt.find("### USER INPUT").unwrap();
        let directive_at = prompt.find(CLOSING_DIRECTIVE).unwrap();
        assert!(instructions_at < context_at);
        assert!(context_at < input_at);
        assert!(input_at < directive_at);
        assert!(prompt.contains("推荐理财"));
    }

    #[test]
    fn context_is_pretty_printed_json() {
        let prompt = compose_prompt("", &bundle(), "你好");
        assert!(prompt.contains("\"task\": \"PRODUCT_RECOMMENDATION\""));
        assert!(prompt.contains("\"risk_grade\": \"A2\""));
    }

    #[test]
    fn directive_is_stable_across_turns() {
        let a = compose_prompt("i1", &bundle(), "u1");
        let b = compose_prompt("i2", &bundle(), "u2");
        assert!(a.ends_with(&format!("{CLOSING_DIRECTIVE}\n")));
        assert!(b.ends_with(&format!("{CLOSING_DIRECTIVE}\n")));
    }
}
