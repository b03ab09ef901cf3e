mod address;
mod date;
mod listing;
mod quality;
mod record;

pub use self::address::VideoAddress;
pub use self::date::UploadDate;
pub use self::listing::{SearchResult, Term};
pub use self::quality::{Quality, QualityRequest, Rendition};
pub use self::record::VideoRecord;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace([' ', '-', '_'], "")
}
