use serde_json::Value;

use crate::table::Table;

/// Reply the model is told to give when the table has no answer.
pub const NOT_FOUND_REPLY: &str = "I don't have that information in the table.";

/// System prompt for table questions. `{headers}` and `{rows}` are filled by [`render`].
pub const SYSTEM_PROMPT: &str = r#"You are a precise table data analyst. Use ONLY the provided table data:

Table Structure:
Headers: {headers}

Data:
{rows}

Rules:
1. Answer strictly from the table
2. For calculations, show your work
3. Handle non-numeric values appropriately
4. Format dates as in table (e.g., Jan-20)
5. If data isn't available, say "{not_found}"
6. Be concise but complete"#;

/// Render the system prompt describing `table`.
pub fn render(table: &Table) -> String {
    let headers = table.headers().join(", ");
    let rows = format_rows(table);
    fill(
        SYSTEM_PROMPT,
        &[
            ("headers", headers.as_str()),
            ("rows", rows.as_str()),
            ("not_found", NOT_FOUND_REPLY),
        ],
    )
}

/// Single-pass placeholder substitution, so table text is never re-expanded.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = after.find('}').and_then(|end| {
            vars.iter()
                .find(|(name, _)| *name == &after[..end])
                .map(|(_, value)| (end, *value))
        });
        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
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

/// One line per row: `header: value` pairs joined by ` | `.
pub fn format_rows(table: &Table) -> String {
    table
        .rows()
        .iter()
        .map(|row| {
            table
                .headers()
                .iter()
                .zip(row)
                .map(|(header, value)| format!("{}: {}", header, cell_text(value)))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
