use crate::OutputFormat;
use anyhow::Result;
use pom_extractor::ExtractionResult;

pub fn render(result: &ExtractionResult, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Env => result
            .entries()
            .iter()
            .map(|e| format!("{}={}\n", e.key, escape_env(&e.value)))
            .collect(),
        OutputFormat::Properties => result
            .entries()
            .iter()
            .map(|e| {
                format!(
                    "{}={}\n",
                    escape_property(&e.key, true),
                    escape_property(&e.value, false)
                )
            })
            .collect(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result)?;
            json.push('\n');
            json
        }
    };
    Ok(text)
}

/// Keep each entry on one line
fn escape_env(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Escape per `java.util.Properties#store`: keys escape every space, values
/// only a leading one.
fn escape_property(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for (index, c) in raw.chars().enumerate() {
        match c {
            ' ' if is_key || index == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04X}"));
                }
            }
            c => out.push(c),
        }
    }
    out
}
