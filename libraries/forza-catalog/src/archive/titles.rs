//! Song and artist extraction from archive item titles and filenames

use forza_core::text::{clean_artist_name, clean_song_name, UNKNOWN_ARTIST};
use regex::Regex;
use std::sync::OnceLock;

/// Display names derived for one archive item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongInfo {
    pub song: String,
    pub artist: String,
}

impl SongInfo {
    fn artist_first(artist: &str, song: &str) -> Self {
        Self {
            song: clean_song_name(song),
            artist: clean_artist_name(artist),
        }
    }
}

struct Patterns {
    dash: Regex,
    by: Regex,
    underscore: Regex,
    dot: Regex,
    mp3: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        dash: compile(r"^(.+?)\s*[-\u{2013}\u{2014}]\s*(.+)$"),
        by: compile(r"(?i)^(.+?)\s+by\s+(.+)$"),
        underscore: compile(r"^(.+?)\s*_\s*(.+)$"),
        dot: compile(r"^(.+?)\s*\.\s*(.+)$"),
        mp3: compile(r"(?i)\.mp3$"),
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex")
}

fn captures<'t>(re: &Regex, text: &'t str) -> Option<(&'t str, &'t str)> {
    let caps = re.captures(text)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Parse `"Artist - Song"` (hyphen, en or em dash) or `"Song by Artist"`
pub fn parse_item_title(title: &str) -> Option<SongInfo> {
    let p = patterns();
    if let Some((artist, song)) = captures(&p.dash, title) {
        return Some(SongInfo::artist_first(artist, song));
    }
    captures(&p.by, title).map(|(song, artist)| SongInfo::artist_first(artist, song))
}

/// Parse an audio filename; always yields something
pub(crate) fn parse_filename(filename: &str) -> SongInfo {
    let p = patterns();
    let stem = p.mp3.replace(filename, "");

    for re in [&p.dash, &p.underscore, &p.dot] {
        if let Some((artist, song)) = captures(re, &stem) {
            return SongInfo::artist_first(artist, song);
        }
    }
    if let Some((song, artist)) = captures(&p.by, &stem) {
        return SongInfo::artist_first(artist, song);
    }

    SongInfo {
        song: clean_song_name(&stem),
        artist: UNKNOWN_ARTIST.to_string(),
    }
}

/// Derive display names for an item, trying title, then filename, then the
/// raw creator/title fields
pub(crate) fn extract_song_info(
    identifier: &str,
    title: Option<&str>,
    creator: Option<&str>,
    mp3_name: &str,
) -> SongInfo {
    if let Some(title) = title.filter(|t| !t.is_empty() && *t != identifier) {
        if let Some(info) = parse_item_title(title) {
            return info;
        }
    }

    if identifier.starts_with("music-") {
        return parse_filename(mp3_name);
    }

    SongInfo {
        song: clean_song_name(title.unwrap_or(identifier)),
        artist: clean_artist_name(creator.unwrap_or(UNKNOWN_ARTIST)),
    }
}
