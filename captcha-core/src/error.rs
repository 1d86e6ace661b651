/// Failures surfaced by the captcha.
///
/// Only [`Error::MissingRoot`] and [`Error::InvalidConfig`] ever reach the host
/// page; the remaining variants are logged and turned into a degraded visual
/// state or an ordinary failed attempt.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("mount root not found: {0}")]
    MissingRoot(String),
    #[error("dom operation failed: {0}")]
    Dom(String),
    #[error("image load failed: {0}")]
    ImageLoad(String),
    #[error("image pair request failed: {0}")]
    Request(String),
    #[error("verifier rejected the attempt: {0}")]
    Verifier(String),
}

pub type Result<T> = std::result::Result<T, Error>;

