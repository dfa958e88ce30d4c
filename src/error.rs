use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid variable name '{0}' (expected [A-Za-z0-9_]+)")]
    InvalidName(String),

    #[error("invalid prefix limit {0} (must be between 1 and 9999)")]
    InvalidLimit(i64),

    #[error("unrecognized expression '{0}'")]
    UnrecognizedExpression(String),

    #[error("expression '{0}' cannot be matched: exploded values have no fixed shape")]
    Unmatchable(String),

    #[error("template '{template}' does not support extraction")]
    ExtractionNotSupported {
        template: String,
        #[source]
        source: Box<Error>,
    },

    #[error("URL '{0}' doesn't match template")]
    UrlDoesntMatchTemplate(String),

    #[error("captured value '{value}' for '{name}' is not valid percent-encoded UTF-8")]
    InvalidPercentEncoding { name: String, value: String },

    #[error("failed to build matching regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("expansion is not a valid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
