use serde_json::Value;

const REASONING_TAGS: [&str; 2] = ["think", "thinking"];

/// Recovers the JSON object from a raw completion.
///
/// Removes `<think>…</think>` blocks, markdown code fences, and anything before the
/// first `{` or after the last `}`.
pub fn clean_json_output(raw: &str) -> String {
    let mut text = raw.to_string();
    for tag in REASONING_TAGS {
        text = strip_delimited_blocks(&text, &format!("<{}>", tag), &format!("</{}>", tag));
    }

    let text = text.replace("```json", "").replace("```JSON", "").replace("```", "");

    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if end > start {
                return text[start..=end].to_string();
            }
        }
    }
    text.trim().to_string()
}

fn strip_delimited_blocks(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        let Some(end) = rest[start..].find(close) else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + end + close.len()..];
    }
    out.push_str(rest);
    out
}

/// A period removed by the completeness filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedPeriod {
    pub period: String,
    pub missing: Vec<String>,
}

/// Keeps only the periods in `payload["periods"]` that carry every required field
/// with a non-null value. Returns what was dropped.
pub fn retain_complete_periods(payload: &mut Value, required_fields: &[String]) -> Vec<DroppedPeriod> {
    let Some(periods) = payload.get_mut("periods").and_then(Value::as_array_mut) else {
        return Vec::new();
    };

    let mut dropped = Vec::new();
    periods.retain(|period| {
        let missing: Vec<String> = required_fields
            .iter()
            .filter(|field| period.get(field.as_str()).map_or(true, Value::is_null))
            .cloned()
            .collect();

        if missing.is_empty() {
            return true;
        }

        let label = period
            .get("period_end_date")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Date")
            .to_string();
        dropped.push(DroppedPeriod {
            period: label,
            missing,
        });
        false
    });

    dropped
}
