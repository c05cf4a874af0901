use crate::QrImage;
use pairlink_core::SessionId;

/// Body served before the first pairing code arrives
pub const NOT_READY_BODY: &str = "QR code not ready";

/// Render the pairing page for the current QR image
pub fn render(image: &QrImage, session_id: &SessionId) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <meta charset="utf-8">
        <title>Scan QR Code</title>
    </head>
    <body style="display:flex;justify-content:center;align-items:center;height:100vh;background:#f0f0f0;">
        <div>
            <h2>Scan QR Code to Connect WhatsApp</h2>
            <img src="{}" alt="Pairing QR code" />
            <p>Session ID: <b>{}</b></p>
        </div>
    </body>
</html>
"#,
        image.data_url(),
        escape_html(session_id.as_str())
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
