use base64::{engine::general_purpose::STANDARD, Engine as _};
use totem_core::{
    provider::{EntropySource, QrRenderer, TimeSource},
    ProvisioningUri,
};
use tracing::{debug, warn};

use crate::{
    create_secret, Config, Error, OtpCode, Totp, DEFAULT_DISCREPANCY, DEFAULT_SECRET_BITS,
};

/// Default edge length of rendered QR codes.
pub const DEFAULT_QR_SIZE: u32 = 200;
/// Default amount of seconds that time sources may differ from each other.
pub const DEFAULT_LENIENCY: u64 = 5;

/// Two-factor authentication facade that combines a [`Totp`] generator with the external
/// capabilities it needs: randomness for new secrets, the current time and QR code rendering.
pub struct Authenticator<E, T, R> {
    totp: Totp,
    entropy: E,
    time: T,
    renderer: R,
}

impl<E, T, R> Authenticator<E, T, R>
where
    E: EntropySource,
    T: TimeSource,
    R: QrRenderer,
{
    pub fn new(config: Config, entropy: E, time: T, renderer: R) -> Result<Self, Error> {
        Ok(Self {
            totp: Totp::new(config)?,
            entropy,
            time,
            renderer,
        })
    }

    #[must_use]
    pub fn totp(&self) -> &Totp {
        &self.totp
    }

    /// Create a new secret with `bits` of entropy, [`DEFAULT_SECRET_BITS`] if absent.
    pub fn create_secret(&self, bits: Option<u32>, require_secure: bool) -> Result<String, Error> {
        create_secret(
            &self.entropy,
            bits.unwrap_or(DEFAULT_SECRET_BITS),
            require_secure,
        )
    }

    /// Compute the code at `time`, or at the current time of the time source if absent.
    pub fn code(&self, secret: &str, time: Option<u64>) -> Result<OtpCode, Error> {
        let time = self.time_or_now(time)?;
        self.totp.code_at(secret, time)
    }

    /// Verify a user submitted `code` at `time` (the current time if absent), accepting
    /// `discrepancy` time steps before and after ([`DEFAULT_DISCREPANCY`] if absent).
    pub fn verify_code(
        &self,
        secret: &str,
        code: &str,
        discrepancy: Option<u32>,
        time: Option<u64>,
    ) -> Result<bool, Error> {
        let time = self.time_or_now(time)?;
        self.totp.verify_at(
            secret,
            code,
            discrepancy.unwrap_or(DEFAULT_DISCREPANCY),
            time,
        )
    }

    #[must_use]
    pub fn provisioning_uri(&self, label: &str, secret: &str) -> ProvisioningUri {
        self.totp.provisioning_uri(label, secret)
    }

    /// Render the provisioning URI as QR code and return it as `data:` URI, ready to be embedded
    /// in web pages.
    pub fn qr_code_data_uri(
        &self,
        label: &str,
        secret: &str,
        size: Option<u32>,
    ) -> Result<String, Error> {
        let uri = self.provisioning_uri(label, secret).to_string();
        let image = self
            .renderer
            .render(&uri, size.unwrap_or(DEFAULT_QR_SIZE))?;

        Ok(format!(
            "data:{};base64,{}",
            image.mime_type,
            STANDARD.encode(&image.data)
        ))
    }

    /// Make sure the own time source agrees with each of the given `sources`, allowing them to
    /// differ by `leniency` seconds ([`DEFAULT_LENIENCY`] if absent).
    pub fn ensure_correct_time(
        &self,
        sources: &[&dyn TimeSource],
        leniency: Option<u64>,
    ) -> Result<(), Error> {
        let leniency = leniency.unwrap_or(DEFAULT_LENIENCY);
        let reference = self.time.unix_time()?;

        for (index, source) in sources.iter().enumerate() {
            let difference = source.unix_time()?.abs_diff(reference);
            if difference > leniency {
                warn!(index, difference, leniency, "time source drifted");
                return Err(Error::TimeMismatch { index, difference });
            }
        }

        debug!(sources = sources.len(), leniency, "time sources agree");
        Ok(())
    }

    fn time_or_now(&self, time: Option<u64>) -> Result<u64, Error> {
        match time {
            Some(time) => Ok(time),
            None => self.time.unix_time().map_err(Into::into),
        }
    }
}
