//! Release category detection from folder names.
//!
//! Scene release names carry enough structure to classify without
//! touching the folder contents: episode markers, year + source tokens,
//! audio format tags, version + platform tokens. Detection is ordered
//! most-specific-first; a name matching nothing stays uncategorized.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

lazy_static! {
    /// SxxEyy, NxNN and daily-date episode markers
    static ref EPISODE: Regex = Regex::new(
        r"(?i)\bS\d{1,2}E\d{1,3}\b|\b\d{1,2}x\d{2,3}\b|\b(19|20)\d{2}[.\- ]\d{2}[.\- ]\d{2}\b"
    )
    .expect("invalid episode pattern");

    /// Audio format or bitrate token, the mark of a music release
    static ref MUSIC: Regex = Regex::new(
        r"(?i)[.\- _](FLAC|MP3|OGG|AAC|ALAC|320|V0|WAV)[.\- _]"
    )
    .expect("invalid music pattern");

    /// Year plus a source/resolution/codec token
    static ref MOVIE: Regex = Regex::new(
        r"(?i)\b(19|20)\d{2}\b.*\b(2160p|1080p|720p|480p|BluRay|BDRip|WEB[.\- ]?DL|WEBRip|HDTV|DVDRip|DVDR|REMUX|x264|x265|H[.]?264|H[.]?265|XviD)\b"
    )
    .expect("invalid movie pattern");

    /// Version number plus a platform or cracking token
    static ref APP: Regex = Regex::new(
        r"(?i)\bv?\d+([.\-_]\d+){1,3}\b.*\b(win(32|64)?|windows|linux|macos|x64|x86|keygen|cracked|retail|multilingual)\b"
    )
    .expect("invalid app pattern");

    /// Ebook format tokens
    static ref BOOK: Regex = Regex::new(r"(?i)\b(eBook|EPUB|MOBI|AZW3?|PDF|RETAiL[.\- ]eBook)\b")
        .expect("invalid book pattern");
}

/// Classify a release name into a category tag.
///
/// Returns `None` for names that carry no recognizable release markers;
/// callers treat that as "unknown category", not as an error.
pub fn detect_category(name: &str) -> Option<&'static str> {
    let name = name.trim_end_matches(['/', '\\']);
    if name.is_empty() {
        return None;
    }

    if EPISODE.is_match(name) {
        return Some("episode");
    }
    // Movie requires a year followed by a video source/codec token, so
    // tagged album names with a year fall through to the music check
    if MOVIE.is_match(name) {
        return Some("movie");
    }
    if MUSIC.is_match(name) {
        return Some("music");
    }
    if APP.is_match(name) {
        return Some("app");
    }
    if BOOK.is_match(name) {
        return Some("book");
    }

    None
}

/// Detect the category for a folder path, honoring an explicit override
pub fn detect_folder_category(folder: &Path, override_category: &str) -> Option<String> {
    if !override_category.is_empty() {
        return Some(override_category.to_string());
    }

    folder
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(detect_category)
        .map(str::to_string)
}

/// Find folders with a detectable release category, recursively
pub fn find_release_folders_recursive(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_dir()
                && entry
                    .file_name()
                    .to_str()
                    .and_then(detect_category)
                    .is_some()
        })
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_names() {
        assert_eq!(
            detect_category("Show.Name.S01E02.1080p.WEB-DL.x264-GRP"),
            Some("episode")
        );
        assert_eq!(detect_category("Show.Name.3x07.HDTV-GRP"), Some("episode"));
        assert_eq!(
            detect_category("Late.Show.2024.03.18.Guest.720p.HDTV.x264-GRP"),
            Some("episode")
        );
    }

    #[test]
    fn test_movie_names() {
        assert_eq!(
            detect_category("Some.Movie.2023.1080p.BluRay.x264-GRP"),
            Some("movie")
        );
        assert_eq!(
            detect_category("Another.Film.1999.720p.WEBRip.XviD-GRP"),
            Some("movie")
        );
    }

    #[test]
    fn test_music_names() {
        assert_eq!(
            detect_category("Artist-Great_Album-CD-FLAC-2024-GRP"),
            Some("music")
        );
        assert_eq!(
            detect_category("Artist_-_Singles-WEB-320-2020-GRP"),
            Some("music")
        );
    }

    #[test]
    fn test_app_names() {
        assert_eq!(
            detect_category("Some.Tool.v2.4.1.x64.Incl.Keygen-GRP"),
            Some("app")
        );
        assert_eq!(detect_category("Editor.Pro.12.0.3.Linux-GRP"), Some("app"));
    }

    #[test]
    fn test_book_names() {
        assert_eq!(
            detect_category("Author.Title.2021.RETAiL.eBook-GRP"),
            Some("book")
        );
        assert_eq!(detect_category("Author-Title.EPUB-GRP"), Some("book"));
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(detect_category("random-folder"), None);
        assert_eq!(detect_category("holiday photos"), None);
        assert_eq!(detect_category(""), None);
    }

    #[test]
    fn test_override_wins() {
        let folder = Path::new("/data/random-folder");
        assert_eq!(
            detect_folder_category(folder, "movie"),
            Some("movie".to_string())
        );
        assert_eq!(detect_folder_category(folder, ""), None);
    }
}
