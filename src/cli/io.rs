//! JSON line I/O for the CLI
//!
//! - Input: one JSON operation per line
//! - Output: one JSON object per line
//! - UTF-8 only

use std::io::{BufRead, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Non-blank input lines, trimmed
pub fn read_lines<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<String>> {
    input.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(Ok(line.trim().to_string())),
        Err(e) => Some(Err(e.into())),
    })
}

/// Write a success response
pub fn write_response<W: Write>(out: &mut W, data: Value) -> CliResult<()> {
    write_json(
        out,
        &serde_json::json!({
            "status": "ok",
            "data": data
        }),
    )
}

/// Write an error response
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    write_json(
        out,
        &serde_json::json!({
            "status": "error",
            "code": code,
            "message": message
        }),
    )
}

/// Write a change event
pub fn write_event<W: Write>(out: &mut W, event: Value) -> CliResult<()> {
    write_json(
        out,
        &serde_json::json!({
            "status": "event",
            "event": event
        }),
    )
}

/// Write one JSON value as a line and flush
pub fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_lines_skips_blank() {
        let input = "{\"op\":\"list_users\"}\n\n   \n{\"op\":\"metrics\"}\n";
        let lines: Vec<String> = read_lines(input.as_bytes()).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["{\"op\":\"list_users\"}", "{\"op\":\"metrics\"}"]);
    }

    #[test]
    fn test_write_response_and_error() {
        let mut out = Vec::new();
        write_response(&mut out, json!([1, 2])).unwrap();
        write_error(&mut out, "NOT_FOUND", "Not found: order o1").unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

        assert_eq!(lines[0], json!({"status": "ok", "data": [1, 2]}));
        assert_eq!(lines[1]["status"], "error");
        assert_eq!(lines[1]["code"], "NOT_FOUND");
    }
}
