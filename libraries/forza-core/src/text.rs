//! Name normalization and cleaning
//!
//! File-derived titles carry noise ("01. ", "(Official Video)", ".mp3") that
//! ruins search matches, so names are cleaned before any art lookup.

use regex::Regex;
use std::sync::OnceLock;

/// Artist placeholder used when a source gives no artist
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Title placeholder used when a source gives no title
pub const UNKNOWN_SONG: &str = "Unknown Song";

struct Patterns {
    music_prefix: Regex,
    track_number: Regex,
    parens: Regex,
    brackets: Regex,
    extension: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        music_prefix: compile(r"^music-\d+"),
        track_number: compile(r"^[0-9]+\.\s*"),
        parens: compile(r"\([^)]*\)"),
        brackets: compile(r"\[[^\]]*\]"),
        extension: compile(r"(?i)\.(mp3|m4a|wav)$"),
        whitespace: compile(r"\s+"),
    })
}

fn compile(pattern: &str) -> Regex {
    // Patterns are literals above; failure is a programming error
    Regex::new(pattern).expect("static regex")
}

/// Trim, lowercase and collapse internal whitespace
///
/// Used for identity and cache keys so cosmetic differences map to one entry.
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Clean a song name for searching
///
/// Falls back to the raw name (minus any `music-` prefix) when cleaning
/// leaves nothing meaningful.
pub fn clean_song_name(name: &str) -> String {
    let p = patterns();
    let mut cleaned = p.music_prefix.replace(name, "").into_owned();
    cleaned = p.track_number.replace(&cleaned, "").into_owned();
    cleaned = p.parens.replace_all(&cleaned, "").into_owned();
    cleaned = p.brackets.replace_all(&cleaned, "").into_owned();
    cleaned = p.extension.replace(cleaned.trim(), "").into_owned();
    cleaned = p.whitespace.replace_all(&cleaned, " ").trim().to_string();

    let meaningless = cleaned
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace());
    if meaningless {
        return name.trim_start_matches("music-").trim().to_string();
    }
    cleaned
}

/// Clean an artist name, defaulting to [`UNKNOWN_ARTIST`]
pub fn clean_artist_name(name: &str) -> String {
    let p = patterns();
    let mut cleaned = p.track_number.replace(name, "").into_owned();
    cleaned = p.parens.replace_all(&cleaned, "").into_owned();
    cleaned = p.brackets.replace_all(&cleaned, "").into_owned();
    cleaned = p.whitespace.replace_all(&cleaned, " ").trim().to_string();
    if cleaned.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefixes_and_noise() {
        assert_eq!(clean_song_name("01. Kerosene (Official Video).mp3"), "Kerosene");
        assert_eq!(clean_song_name("music-12 Celestica [HD]"), "Celestica");
        assert_eq!(clean_song_name("  Baptism   (Live)  "), "Baptism");
        assert_eq!(clean_song_name("Track.M4A"), "Track");
    }

    #[test]
    fn numeric_result_falls_back_to_raw_name() {
        assert_eq!(clean_song_name("music-42"), "42");
        assert_eq!(clean_song_name("(intro)"), "(intro)");
        assert_eq!(clean_song_name("2024"), "2024");
    }

    #[test]
    fn artist_defaults() {
        assert_eq!(clean_artist_name("   "), UNKNOWN_ARTIST);
        assert_eq!(clean_artist_name(" Crystal   Castles "), "Crystal Castles");
        assert_eq!(clean_artist_name("03. Grimes (feat. HANA) [4AD]"), "Grimes");
        assert_eq!(clean_artist_name("(various)"), UNKNOWN_ARTIST);
    }

    #[test]
    fn keys_ignore_case_and_spacing() {
        assert_eq!(normalize_key("  The   Knife "), "the knife");
    }
}
