use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error: {_0}")]
    Config(#[error(not(source))] String),
    /// The request itself failed; carries the message meant for the user.
    #[display("{_0}")]
    Request(#[error(not(source))] String),
    #[display("could not write thumbnail")]
    Thumbnail,
    #[display("could not write output")]
    Output,
}
