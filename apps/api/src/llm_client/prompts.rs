// Prompt fragments shared by every module that calls the model.
// Each feature module keeps its own prompts.rs next to it.

/// Appended to every prompt that expects a structured reply.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Respond ONLY with the JSON object. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";

/// Placeholder used when the caller supplied no goals text.
pub const NONE_SPECIFIED: &str = "None specified";

/// Fills `{key}` placeholders in one left-to-right pass. Substituted values
/// are never rescanned, and braces that do not name a known key are kept.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            vars.iter()
                .find(|(key, _)| *key == &after[..close])
                .map(|(_, value)| (*value, close))
        });
        match hit {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
