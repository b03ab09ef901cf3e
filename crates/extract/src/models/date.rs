use std::fmt::{Display, Formatter, Result as FmtResult};
use time::Date;
use time::macros::format_description;

/// Upload date of a video.
///
/// The site renders dates in several formats depending on the page template,
/// so extraction is best-effort and falls back to [`UploadDate::Unknown`]
/// instead of failing the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UploadDate {
    Known(Date),
    #[default]
    Unknown,
}
impl UploadDate {
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Self::Known(date) => Some(*date),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}
impl From<Option<Date>> for UploadDate {
    fn from(value: Option<Date>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}
impl Display for UploadDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Known(date) => {
                let formatted = date
                    .format(format_description!("[year]-[month]-[day]"))
                    .map_err(|_| std::fmt::Error)?;
                write!(f, "{formatted}")
            },
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
