//! Capabilities that the OTP engine depends on but doesn't implement itself.
//!
//! Each capability is a small trait so that any implementation can be injected, whether it
//! reads the system clock, queries a remote host or returns canned values in tests.

use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Source of raw random bytes for secret generation.
pub trait EntropySource {
    /// Fill a new buffer with `count` random bytes.
    fn random_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError>;

    /// Whether the bytes produced are suitable for cryptographic use.
    fn is_cryptographically_secure(&self) -> bool;
}

/// Source of the current time as seconds since the Unix epoch.
pub trait TimeSource {
    fn unix_time(&self) -> Result<u64, TimeError>;
}

/// Turns text (usually a provisioning URI) into an image that can be scanned by authenticator
/// apps.
pub trait QrRenderer {
    /// Render `text` as image with roughly `size` pixels per side.
    fn render(&self, text: &str, size: u32) -> Result<Image, RenderError>;
}

impl<T: EntropySource + ?Sized> EntropySource for &T {
    fn random_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
        (**self).random_bytes(count)
    }

    fn is_cryptographically_secure(&self) -> bool {
        (**self).is_cryptographically_secure()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn unix_time(&self) -> Result<u64, TimeError> {
        (**self).unix_time()
    }
}

impl<T: QrRenderer + ?Sized> QrRenderer for &T {
    fn render(&self, text: &str, size: u32) -> Result<Image, RenderError> {
        (**self).render(text, size)
    }
}

/// Encoded image data together with its MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
}

/// The entropy source failed to produce random bytes.
#[derive(Debug, thiserror::Error)]
#[error("failed to gather random bytes: {0}")]
pub struct EntropyError(#[source] BoxError);

impl EntropyError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self(source.into())
    }
}

/// The time source failed to report the current time.
#[derive(Debug, thiserror::Error)]
#[error("time source unavailable: {0}")]
pub struct TimeError(#[source] BoxError);

impl TimeError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self(source.into())
    }
}

/// The renderer failed to turn the text into an image.
#[derive(Debug, thiserror::Error)]
#[error("failed to render QR code: {0}")]
pub struct RenderError(#[source] BoxError);

impl RenderError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self(source.into())
    }
}
