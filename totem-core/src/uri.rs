use std::{
    fmt::{self, Display},
    str::FromStr,
};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::{base32, Algorithm, UnsupportedAlgorithm};

/// Characters left as-is in URI components. Everything else, including spaces and reserved
/// characters like `&`, `?` and `/`, is percent-encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const DEFAULT_DIGITS: u8 = 6;
const DEFAULT_PERIOD: u64 = 30;

/// Any error that can happen when parsing a [`ProvisioningUri`] from a string.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input didn't form a valid URL.
    #[error("the URL is not valid")]
    InvalidUrl(#[from] url::ParseError),
    /// An unknown scheme was used in the URL.
    #[error("the scheme `{0}` is not supported, only `otpauth`")]
    InvalidScheme(String),
    /// The host part of the URL was missing.
    #[error("host is missing")]
    MissingHost,
    /// The host part of the URL was unsupported.
    #[error("host (otp type) is `{0}` but only `totp` is supported")]
    InvalidHost(String),
    /// The mandatory `secret` parameter was missing.
    #[error("the `secret` parameter is missing")]
    MissingSecret,
    /// The secret wasn't valid Base32.
    #[error("the secret is not valid Base32")]
    InvalidSecret(#[from] base32::DecodeError),
    /// The algorithm parameter named an unknown algorithm.
    #[error(transparent)]
    Algorithm(#[from] UnsupportedAlgorithm),
    /// A numeric parameter couldn't be parsed.
    #[error("invalid value `{value}` for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: String },
    /// The input was no proper UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// An `otpauth://totp/` provisioning URI in the
/// [Key URI Format](https://github.com/google/google-authenticator/wiki/Key-Uri-Format) that
/// authenticator apps consume, usually through a QR code.
///
/// The [`Display`] implementation renders the URI with the query parameters in a fixed order:
/// `secret`, `issuer`, `period`, `algorithm` and `digits`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisioningUri {
    /// Free form label that identifies the account, like an email address.
    pub label: String,
    /// The shared secret as Base32 text.
    pub secret: String,
    /// Optional issuer (service or company) of the account. Omitted from the URI if absent.
    pub issuer: Option<String>,
    /// Seconds that a single code is valid.
    pub period: u64,
    pub algorithm: Algorithm,
    pub digits: u8,
}

impl Display for ProvisioningUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "otpauth://totp/{}?secret={}",
            utf8_percent_encode(&self.label, COMPONENT),
            utf8_percent_encode(&self.secret, COMPONENT),
        )?;

        if let Some(issuer) = &self.issuer {
            write!(f, "&issuer={}", utf8_percent_encode(issuer, COMPONENT))?;
        }

        write!(
            f,
            "&period={}&algorithm={}&digits={}",
            self.period, self.algorithm, self.digits
        )
    }
}

impl FromStr for ProvisioningUri {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

fn parse(value: &str) -> Result<ProvisioningUri, ParseError> {
    let url = url::Url::parse(value)?;

    if url.scheme() != "otpauth" {
        return Err(ParseError::InvalidScheme(url.scheme().to_owned()));
    }

    let host = url.host_str().ok_or(ParseError::MissingHost)?;
    if !host.eq_ignore_ascii_case("totp") {
        return Err(ParseError::InvalidHost(host.to_owned()));
    }

    let mut secret = None;
    let mut issuer = None;
    let mut algorithm = Algorithm::default();
    let mut digits = DEFAULT_DIGITS;
    let mut period = DEFAULT_PERIOD;

    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "secret" => {
                base32::decode(&value)?;
                secret = Some(value.into_owned());
            }
            "issuer" => issuer = Some(value.into_owned()),
            "algorithm" => algorithm = value.parse()?,
            "digits" => digits = parse_number("digits", &value)?,
            "period" => period = parse_number("period", &value)?,
            _ => {}
        }
    }

    let path = url.path();
    let label = path.strip_prefix('/').unwrap_or(path);
    let label = percent_decode_str(label).decode_utf8()?;

    let (label, prefix) = match label.split_once(':') {
        Some((prefix, label)) => (label.trim_start(), Some(prefix)),
        None => (&*label, None),
    };

    Ok(ProvisioningUri {
        label: label.to_owned(),
        secret: secret.ok_or(ParseError::MissingSecret)?,
        issuer: issuer.or_else(|| prefix.map(ToOwned::to_owned)),
        period,
        algorithm,
        digits,
    })
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidParameter {
        name,
        value: value.to_owned(),
    })
}
