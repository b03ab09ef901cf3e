use exn::OptionExt;
use r34v_extract::models::{QualityRequest, Rendition};

use crate::error::{ErrorKind, Result};

/// Pick a rendition from a list ordered highest quality first.
///
/// An exact request never falls back to a neighbouring quality.
pub fn select(renditions: &[Rendition], requested: QualityRequest) -> Result<&Rendition> {
    let selected = match requested {
        QualityRequest::Best => renditions.first(),
        QualityRequest::Worst => renditions.last(),
        QualityRequest::Exact(quality) => renditions.iter().find(|rendition| rendition.quality == quality),
    };
    selected.ok_or_raise(|| ErrorKind::QualityNotAvailable(requested.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use r34v_extract::models::Quality;
    use rstest::{fixture, rstest};

    #[fixture]
    fn renditions() -> Vec<Rendition> {
        vec![
            Rendition::new(Quality::P2160, "https://cdn.example.com/2160.mp4"),
            Rendition::new(Quality::P1080, "https://cdn.example.com/1080.mp4"),
            Rendition::new(Quality::P720, "https://cdn.example.com/720.mp4"),
            Rendition::new(Quality::P360, "https://cdn.example.com/360.mp4"),
        ]
    }

    #[rstest]
    #[case(QualityRequest::Best, Quality::P2160)]
    #[case(QualityRequest::Worst, Quality::P360)]
    #[case(QualityRequest::Exact(Quality::P720), Quality::P720)]
    #[case(QualityRequest::Exact(Quality::P1080), Quality::P1080)]
    fn test_select(renditions: Vec<Rendition>, #[case] requested: QualityRequest, #[case] expected: Quality) {
        assert_eq!(select(&renditions, requested).unwrap().quality, expected);
    }

    #[rstest]
    fn test_exact_never_substitutes(renditions: Vec<Rendition>) {
        let err = select(&renditions, QualityRequest::Exact(Quality::P480)).unwrap_err();
        assert_eq!(*err, ErrorKind::QualityNotAvailable("480p".to_string()));
    }

    #[test]
    fn test_single_rendition_is_both_best_and_worst() {
        let single = vec![Rendition::new(Quality::P480, "https://cdn.example.com/480.mp4")];
        assert_eq!(select(&single, QualityRequest::Best).unwrap(), &single[0]);
        assert_eq!(select(&single, QualityRequest::Worst).unwrap(), &single[0]);
    }

    #[test]
    fn test_empty() {
        let err = select(&[], QualityRequest::Best).unwrap_err();
        assert_eq!(*err, ErrorKind::QualityNotAvailable("best".to_string()));
    }
}
