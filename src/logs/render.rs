use super::LogEntry;

const REFRESH_SECONDS: u32 = 3;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders entries newest first. `entries` is expected oldest first.
pub fn render_page(entries: &[LogEntry]) -> String {
    let mut rows = String::new();
    for entry in entries.iter().rev() {
        rows.push_str(&format!(
            "<div class=\"entry\"><span class=\"ts\">{}</span> <span class=\"msg\">{}</span></div>\n",
            entry.timestamp.format("%H:%M:%S"),
            escape_html(&entry.message)
        ));
    }
    if rows.is_empty() {
        rows.push_str("<div class=\"empty\">No log entries yet.</div>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta http-equiv=\"refresh\" content=\"{refresh}\">\n\
         <title>Herald logs</title>\n\
         <style>\n\
         body {{ background: #111; color: #ddd; font-family: monospace; margin: 1em; }}\n\
         .entry {{ padding: 2px 0; border-bottom: 1px solid #222; white-space: pre-wrap; }}\n\
         .ts {{ color: #6a9; }}\n\
         </style>\n\
         </head>\n<body>\n<h1>Herald logs</h1>\n{rows}</body>\n</html>\n",
        refresh = REFRESH_SECONDS,
        rows = rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{ TimeZone, Utc };

    fn entry(second: u32, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 10, 20, second).unwrap(),
            message: message.to_string(),
        }
    }

    #[test]
    fn newest_entry_is_rendered_first() {
        let html = render_page(&[entry(1, "first"), entry(2, "second")]);
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(second < first);
        assert!(html.contains("10:20:01"));
    }

    #[test]
    fn page_refreshes_every_three_seconds() {
        let html = render_page(&[]);
        assert!(html.contains("<meta http-equiv=\"refresh\" content=\"3\">"));
        assert!(html.contains("No log entries yet."));
    }

    #[test]
    fn user_text_is_escaped() {
        let html = render_page(&[entry(0, "[1] eve: <script>alert('x')</script> & co")]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co"));
    }
}
