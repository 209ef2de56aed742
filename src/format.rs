//! Quality tiers and yt-dlp format selection
//!
//! Maps the client-supplied quality label to the `-f` expression passed to
//! yt-dlp. The mapping is total: anything that is not an exact, case-sensitive
//! match for a known tier falls through to [`Quality::Best`].

use serde::Serialize;
use std::fmt;

/// Quality tier requested by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quality {
    /// At most 1080 lines
    #[serde(rename = "1080p")]
    P1080,
    /// At most 720 lines
    #[serde(rename = "720p")]
    P720,
    /// At most 480 lines
    #[serde(rename = "480p")]
    P480,
    /// Best available video plus best available audio
    #[serde(rename = "best")]
    Best,
}

impl Quality {
    /// Resolve a quality label. Unknown labels (including "") map to `Best`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "1080p" => Quality::P1080,
            "720p" => Quality::P720,
            "480p" => Quality::P480,
            _ => Quality::Best,
        }
    }

    /// Height cap in lines, `None` for [`Quality::Best`]
    pub fn max_height(self) -> Option<u32> {
        match self {
            Quality::P1080 => Some(1080),
            Quality::P720 => Some(720),
            Quality::P480 => Some(480),
            Quality::Best => None,
        }
    }

    /// yt-dlp format expression for this tier
    pub fn format_spec(self) -> FormatSpec {
        FormatSpec::from(self)
    }
}

/// A yt-dlp format-selection expression (the argument to `-f`)
///
/// Capped tiers prefer an H.264 video stream with an AAC audio track so the
/// merged mp4 plays in browsers, then fall back to the best single mp4, then
/// to whatever is best.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec(String);

impl FormatSpec {
    /// Resolve the format expression for a raw quality label
    pub fn for_quality(label: &str) -> Self {
        Quality::from_label(label).format_spec()
    }

    /// The expression as passed on the command line
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Quality> for FormatSpec {
    fn from(quality: Quality) -> Self {
        match quality.max_height() {
            Some(height) => FormatSpec(format!(
                "bv*[height<={height}][vcodec^=avc1]+ba[acodec^=mp4a]/best[ext=mp4]/best"
            )),
            None => FormatSpec("bestvideo+bestaudio/best".to_string()),
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<std::ffi::OsStr> for FormatSpec {
    fn as_ref(&self) -> &std::ffi::OsStr {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capped_tiers() {
        assert_eq!(
            FormatSpec::for_quality("1080p").as_str(),
            "bv*[height<=1080][vcodec^=avc1]+ba[acodec^=mp4a]/best[ext=mp4]/best"
        );
        assert_eq!(
            FormatSpec::for_quality("720p").as_str(),
            "bv*[height<=720][vcodec^=avc1]+ba[acodec^=mp4a]/best[ext=mp4]/best"
        );
        assert_eq!(
            FormatSpec::for_quality("480p").as_str(),
            "bv*[height<=480][vcodec^=avc1]+ba[acodec^=mp4a]/best[ext=mp4]/best"
        );
    }

    #[test]
    fn test_capped_tiers_fall_back_through_mp4_then_best() {
        for label in ["1080p", "720p", "480p"] {
            let spec = FormatSpec::for_quality(label);
            let height = Quality::from_label(label).max_height().unwrap_or_default();
            assert!(spec.as_str().contains(&format!("[height<={height}]")));
            assert!(spec.as_str().ends_with("/best[ext=mp4]/best"));
        }
    }

    #[test]
    fn test_everything_else_is_best() {
        for label in ["", "best", "4k", "1080P", "720", " 720p", "garbage"] {
            assert_eq!(Quality::from_label(label), Quality::Best, "label {label:?}");
            assert_eq!(
                FormatSpec::for_quality(label).as_str(),
                "bestvideo+bestaudio/best",
                "label {label:?}"
            );
        }
    }

    #[test]
    fn test_max_height() {
        assert_eq!(Quality::P1080.max_height(), Some(1080));
        assert_eq!(Quality::P720.max_height(), Some(720));
        assert_eq!(Quality::P480.max_height(), Some(480));
        assert_eq!(Quality::Best.max_height(), None);
    }

    #[test]
    fn test_display_matches_as_str() {
        let spec = Quality::P720.format_spec();
        assert_eq!(spec.to_string(), spec.as_str());
    }
}
