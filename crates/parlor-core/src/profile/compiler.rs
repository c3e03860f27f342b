//! Profile-to-prompt compiler.
//!
//! Turns a stored profile into the natural-language fragment appended to the
//! system prompt. Output depends only on the values of a fixed list of keys,
//! never on the order fields were stored in.

use serde_json::Value;

use parlor_types::profile::Profile;

/// Known fields in output order, each as (key, sentence prefix, suffix).
const FIELD_SENTENCES: [(&str, &str, &str); 6] = [
    ("name", "The user's name is ", "."),
    ("age", "They are ", " years old."),
    ("goals", "Their goals include: ", "."),
    ("dietary_preferences", "Their dietary preferences: ", "."),
    ("fitness_level", "Their fitness level: ", "."),
    ("interests", "Their interests: ", "."),
];

/// Compile a profile into a prompt fragment.
///
/// One sentence per present, non-empty known field, then exactly one tone
/// sentence (professional unless the profile selects another known tone),
/// joined with single spaces. An absent profile compiles to `""`.
pub fn compile_profile(profile: Option<&Profile>) -> String {
    let Some(profile) = profile else {
        return String::new();
    };

    let mut fragments: Vec<String> = FIELD_SENTENCES
        .iter()
        .filter_map(|(key, prefix, suffix)| {
            let text = profile.field(key).and_then(render_value)?;
            Some(format!("{prefix}{text}{suffix}"))
        })
        .collect();

    fragments.push(profile.tone().instruction().to_string());
    fragments.join(" ")
}

/// Render a field value as sentence text. Lists are joined with ", ".
/// Returns `None` for values that carry nothing to say.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_scalar).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => render_scalar(other),
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
