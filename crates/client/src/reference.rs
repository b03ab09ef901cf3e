use std::str::FromStr;

use r34v_extract::models::VideoAddress;

use crate::error::{Error, ErrorKind};

/// A user-supplied pointer to a video, before any cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `{id}/{slug}` or a full detail URL: authoritative, no lookup needed.
    Qualified(VideoAddress),
    /// Just `{id}`, which only resolves through an earlier listing.
    Bare(u64),
}
impl Reference {
    pub fn id(&self) -> u64 {
        match self {
            Self::Qualified(address) => address.id,
            Self::Bare(id) => *id,
        }
    }
}

impl FromStr for Reference {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || exn::Exn::from(ErrorKind::InvalidReference(s.to_string()));
        if input.contains("://") || input.starts_with("/video") {
            let address = VideoAddress::from_url(input).ok_or_else(invalid)?;
            return Ok(address.into());
        }
        let input = input.trim_matches('/');
        let (id, slug) = match input.split_once('/') {
            Some((id, slug)) => (id, Some(slug)),
            None => (input, None),
        };
        let id = id.parse::<u64>().map_err(|_| invalid())?;
        match slug {
            None => Ok(Self::Bare(id)),
            Some(slug) if slug.is_empty() || slug.contains(['/', '?', '#']) || slug.contains(char::is_whitespace) => {
                Err(invalid())
            },
            Some(slug) => Ok(Self::Qualified(VideoAddress::new(id, slug))),
        }
    }
}

impl From<VideoAddress> for Reference {
    fn from(address: VideoAddress) -> Self {
        if address.is_qualified() {
            Self::Qualified(address)
        } else {
            Self::Bare(address.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3055012/ankha-animation-minus82", Reference::Qualified(VideoAddress::new(3055012, "ankha-animation-minus82")))]
    #[case(" 3055012/ankha-animation-minus82/ ", Reference::Qualified(VideoAddress::new(3055012, "ankha-animation-minus82")))]
    #[case("3055012", Reference::Bare(3055012))]
    #[case("3055012/", Reference::Bare(3055012))]
    #[case(
        "https://rule34video.com/video/3055012/ankha-animation-minus82/",
        Reference::Qualified(VideoAddress::new(3055012, "ankha-animation-minus82"))
    )]
    #[case("https://rule34video.com/videos/3055012/", Reference::Bare(3055012))]
    #[case("/video/3055012/ankha-animation-minus82/", Reference::Qualified(VideoAddress::new(3055012, "ankha-animation-minus82")))]
    #[case("3055012/video-game-parody", Reference::Qualified(VideoAddress::new(3055012, "video-game-parody")))]
    #[case("42/videogame-heroes", Reference::Qualified(VideoAddress::new(42, "videogame-heroes")))]
    fn test_parse(#[case] input: &str, #[case] expected: Reference) {
        assert_eq!(input.parse::<Reference>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ankha")]
    #[case("-5")]
    #[case("12abc/slug")]
    #[case("12/two/segments")]
    #[case("12/with space")]
    #[case("https://rule34video.com/tags/fox/")]
    #[case("99999999999999999999999")]
    fn test_invalid(#[case] input: &str) {
        let err = input.parse::<Reference>().unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidReference(input.to_string()));
    }
}
