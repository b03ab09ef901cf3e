use std::collections::BTreeSet;

use super::{Quality, Rendition, UploadDate, VideoAddress};

/// Normalized metadata of a single video.
///
/// Required fields (`id`, `slug`, `title`, at least one rendition) are always
/// present; optional fields that could not be read from the page are `None`
/// (or [`UploadDate::Unknown`]) rather than a silently invented default.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoRecord {
    /// Numeric video ID
    pub id: u64,
    /// URL slug
    pub slug: String,
    pub title: String,
    pub duration_seconds: Option<u64>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub dislikes: Option<u64>,
    pub upload_date: UploadDate,
    pub uploader: Option<String>,
    /// Preview image URL
    pub thumbnail: Option<String>,
    /// Trimmed, lowercased tag names
    pub tags: BTreeSet<String>,
    /// Trimmed, lowercased primary category
    pub category: Option<String>,
    /// Available renditions, highest quality first (never empty)
    pub renditions: Vec<Rendition>,
}
impl VideoRecord {
    pub fn address(&self) -> VideoAddress {
        VideoAddress::new(self.id, self.slug.clone())
    }

    /// Percentage of likes over all votes, if any votes are known.
    pub fn rating(&self) -> Option<f64> {
        let likes = self.likes?;
        let total = likes.checked_add(self.dislikes.unwrap_or(0))?;
        (total > 0).then(|| (likes as f64 / total as f64 * 10_000.0).round() / 100.0)
    }

    pub fn qualities(&self) -> impl Iterator<Item = Quality> + '_ {
        self.renditions.iter().map(|r| r.quality)
    }

    /// `MM:SS`, or `H:MM:SS` for anything an hour or longer.
    pub fn duration_display(&self) -> Option<String> {
        let seconds = self.duration_seconds?;
        let (hours, minutes, seconds) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
        Some(if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        })
    }
}
