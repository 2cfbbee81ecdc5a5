//! YouTube URL validation and video-id extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::DownloadError;

// Scheme is optional; everything else is checked against the parsed URL.
static YOUTUBE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/").unwrap());

/// A validated video reference. The id keys the thumbnail fetch; bare
/// `youtu.be/` links are accepted and carry no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub url: String,
    pub video_id: Option<String>,
}

/// Accepts watch URLs with a `v` parameter, shorts, and youtu.be links.
pub fn validate_url(raw: &str) -> Result<VideoRef, DownloadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DownloadError::EmptyUrl);
    }
    if !YOUTUBE_RE.is_match(trimmed) {
        return Err(DownloadError::InvalidUrl);
    }

    let absolute = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&absolute).map_err(|_| DownloadError::InvalidUrl)?;
    let host = parsed.host_str().unwrap_or_default();
    let segments: Vec<&str> = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    if host.ends_with("youtu.be") {
        let video_id = segments.first().map(|s| s.to_string());
        return Ok(VideoRef { url: absolute, video_id });
    }

    if parsed.path().contains("watch") {
        let v = parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.is_empty());
        return match v {
            Some(id) => Ok(VideoRef {
                url: absolute,
                video_id: Some(id),
            }),
            None => Err(DownloadError::InvalidUrl),
        };
    }

    if segments.first() == Some(&"shorts") {
        let video_id = segments.get(1).map(|s| s.to_string());
        return Ok(VideoRef { url: absolute, video_id });
    }

    Err(DownloadError::InvalidUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(url: &str) -> Option<String> {
        validate_url(url).expect("should validate").video_id
    }

    #[test]
    fn accepts_watch_urls() {
        assert_eq!(
            id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn accepts_scheme_less_urls() {
        assert_eq!(
            id_of("www.youtube.com/watch?v=abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn accepts_shorts_and_short_links() {
        assert_eq!(
            id_of("https://youtube.com/shorts/xyz"),
            Some("xyz".to_string())
        );
        assert_eq!(id_of("https://youtu.be/abc"), Some("abc".to_string()));
    }

    #[test]
    fn bare_short_link_has_no_id() {
        assert_eq!(id_of("https://youtu.be/"), None);
    }

    #[test]
    fn playlist_watch_url_still_resolves_the_video() {
        assert_eq!(
            id_of("https://www.youtube.com/watch?v=abc&list=PLx"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn rejects_watch_without_video_parameter() {
        assert!(matches!(
            validate_url("https://www.youtube.com/watch?list=PLx"),
            Err(DownloadError::InvalidUrl)
        ));
    }

    #[test]
    fn rejects_other_hosts_and_channel_pages() {
        assert!(validate_url("https://vimeo.com/12345").is_err());
        assert!(validate_url("https://www.youtube.com/@somechannel").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(validate_url("   "), Err(DownloadError::EmptyUrl)));
    }
}
