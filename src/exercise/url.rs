use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VideoUrlError {
    #[error("URL {0} is invalid")]
    InvalidUrl(String),

    #[error("the stream type of {0} is not supported")]
    UnsupportedStream(String),
}

const HOSTED_PAGES: [&str; 3] = [
    r"^http://www\.youtube\.com/",
    r"^http://vimeo\.com/",
    r"^http://www\.dailymotion\.com/",
];

const FILE_EXTENSIONS: &str = r"(?i)\.(mp4|ogg|ogv|webm)$";

/// Checks that `url` points at a stream the player can show: a hosted video
/// page or a plain video file.
pub fn validate_video_url(url: &str) -> Result<(), VideoUrlError> {
    let url_syntax = Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+[^\s]*$").unwrap();
    if !url_syntax.is_match(url) {
        return Err(VideoUrlError::InvalidUrl(url.to_string()));
    }

    let hosted = HOSTED_PAGES
        .iter()
        .any(|pattern| Regex::new(pattern).unwrap().is_match(url));
    let file = Regex::new(FILE_EXTENSIONS).unwrap().is_match(url);

    if hosted || file {
        Ok(())
    } else {
        Err(VideoUrlError::UnsupportedStream(url.to_string()))
    }
}

/// Guesses the MIME type the player needs for `url`.
pub fn mime_type_for(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.starts_with("http://www.youtube.com/") {
        Some("video/youtube")
    } else if lower.starts_with("http://vimeo.com/") {
        Some("video/vimeo")
    } else if lower.starts_with("http://www.dailymotion.com/") {
        Some("video/dailymotion")
    } else if lower.ends_with(".mp4") {
        Some("video/mp4")
    } else if lower.ends_with(".ogg") || lower.ends_with(".ogv") {
        Some("video/ogg")
    } else if lower.ends_with(".webm") {
        Some("video/webm")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hosted_pages_and_files() {
        assert!(validate_video_url("http://www.youtube.com/watch?v=abc").is_ok());
        assert!(validate_video_url("http://vimeo.com/123").is_ok());
        assert!(validate_video_url("https://cdn.example.com/clip.WEBM").is_ok());
        assert!(validate_video_url("ftp://files.example.com/movie.ogv").is_ok());
    }

    #[test]
    fn rejects_other_urls() {
        assert_eq!(
            validate_video_url("not a url"),
            Err(VideoUrlError::InvalidUrl(String::from("not a url")))
        );
        assert!(matches!(
            validate_video_url("https://example.com/page.html"),
            Err(VideoUrlError::UnsupportedStream(_))
        ));
    }

    #[test]
    fn guesses_mime_types() {
        assert_eq!(mime_type_for("http://x.org/a.mp4"), Some("video/mp4"));
        assert_eq!(mime_type_for("http://x.org/a.ogv"), Some("video/ogg"));
        assert_eq!(mime_type_for("http://www.youtube.com/watch?v=1"), Some("video/youtube"));
        assert_eq!(mime_type_for("http://x.org/a.avi"), None);
    }
}
