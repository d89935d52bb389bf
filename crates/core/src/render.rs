use std::fmt::Write as _;

use crate::types::NormalizedEvent;

/// Renders a notification using Telegram's HTML parse mode.
///
/// Lines are emitted in a fixed order: title, wallet, type, mint, amount,
/// timestamp, then one line per link.
pub fn render(event: &NormalizedEvent) -> String {
    let mut text = String::with_capacity(256);
    let _ = writeln!(text, "🟣 <b>{}</b>", escape_html(&event.title));
    let _ = writeln!(text, "Wallet: <code>{}</code>", escape_html(&event.wallet_address));
    let _ = writeln!(text, "Type: <b>{}</b>", escape_html(&event.transaction_type));
    let _ = writeln!(text, "Mint: <code>{}</code>", escape_html(&event.token_mint));
    let _ = writeln!(text, "Amount: <b>{}</b>", escape_html(&event.token_amount));
    let _ = write!(text, "Time (UTC): {}", escape_html(&event.timestamp_utc));
    for link in &event.links {
        let _ = write!(
            text,
            "\n{}: {}",
            escape_html(&link.label),
            escape_html(&link.url)
        );
    }
    text
}

/// Escapes the characters Telegram's HTML parser treats as markup.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
