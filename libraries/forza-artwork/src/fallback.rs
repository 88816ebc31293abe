//! Deterministic generated artwork
//!
//! Used when no search step yields an acceptable image, and for the empty
//! catalog placeholder. Pure functions of their input; never touch the
//! network.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use forza_core::text::clean_song_name;

const MAX_LABEL_CHARS: usize = 20;

/// 32-bit string hash over UTF-16 code units of the lowercased
/// concatenation of title and artist
pub fn title_hash(title: &str, artist: &str) -> i32 {
    let text = format!("{title}{artist}").to_lowercase();
    text.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

/// Three hues spaced 120 degrees apart, seeded by [`title_hash`]
pub fn gradient_hues(title: &str, artist: &str) -> [u32; 3] {
    let hue = title_hash(title, artist).unsigned_abs() % 360;
    [hue, (hue + 120) % 360, (hue + 240) % 360]
}

/// Radial-gradient SVG as a base64 data URI
pub fn gradient_image(title: &str, artist: &str) -> String {
    let [hue1, hue2, hue3] = gradient_hues(title, artist);
    let label: String = clean_song_name(title).chars().take(MAX_LABEL_CHARS).collect();

    let svg = format!(
        concat!(
            r#"<svg width="400" height="400" xmlns="http://www.w3.org/2000/svg">"#,
            r#"<defs>"#,
            r#"<radialGradient id="grad" cx="30%" cy="30%" r="70%">"#,
            r#"<stop offset="0%" style="stop-color:hsl({h1}, 80%, 70%);stop-opacity:1"/>"#,
            r#"<stop offset="50%" style="stop-color:hsl({h2}, 70%, 60%);stop-opacity:1"/>"#,
            r#"<stop offset="100%" style="stop-color:hsl({h3}, 60%, 50%);stop-opacity:1"/>"#,
            r#"</radialGradient>"#,
            r#"<filter id="shadow" x="-20%" y="-20%" width="140%" height="140%">"#,
            r#"<feDropShadow dx="2" dy="2" stdDeviation="3" flood-color="rgba(0,0,0,0.3)"/>"#,
            r#"</filter>"#,
            r#"</defs>"#,
            r#"<rect width="100%" height="100%" fill="url(#grad)"/>"#,
            r#"<circle cx="200" cy="200" r="80" fill="rgba(255,255,255,0.1)" filter="url(#shadow)"/>"#,
            r#"<text x="50%" y="45%" font-family="Arial, sans-serif" font-size="48" fill="white" text-anchor="middle" filter="url(#shadow)">&#127925;</text>"#,
            r#"<text x="50%" y="75%" font-family="Arial, sans-serif" font-size="14" fill="white" text-anchor="middle" opacity="0.8">{label}</text>"#,
            r#"</svg>"#,
        ),
        h1 = hue1,
        h2 = hue2,
        h3 = hue3,
        label = escape_xml(&label),
    );

    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// Image shown while the catalog is empty
pub fn placeholder_image(label: &str) -> String {
    gradient_image(label, "")
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
