use subtle::{Choice, ConstantTimeEq};
use totem_core::{Algorithm, Key, ProvisioningUri};
use tracing::debug;

use crate::{hotp, ConfigError, Error, OtpCode, DEFAULT_DIGITS, DEFAULT_PERIOD};

/// Amount of time steps before and after the current one that are accepted during verification.
pub const DEFAULT_DISCREPANCY: u32 = 1;

/// Settings of a [`Totp`] generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Amount of digits to produce as OTP.
    pub digits: u8,
    /// Seconds that an OTP is considered valid.
    pub period: u64,
    /// Algorithm that is used to generate OTPs.
    pub algorithm: Algorithm,
    /// Optional issuer, shown by authenticator apps next to the account label.
    pub issuer: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
            algorithm: Algorithm::default(),
            issuer: None,
        }
    }
}

/// Time based OTP generator.
///
/// The settings are validated once on creation and never change afterwards, so a single instance
/// can be shared freely between threads.
#[derive(Clone, Debug)]
pub struct Totp {
    config: Config,
}

impl Totp {
    pub fn new(config: Config) -> Result<Self, Error> {
        if config.digits == 0 {
            return Err(ConfigError::ZeroDigits.into());
        }
        if config.period == 0 {
            return Err(ConfigError::ZeroPeriod.into());
        }

        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Counter for the given Unix `time`, shifted by `offset` whole time steps.
    ///
    /// Shifting before the epoch saturates at zero.
    #[must_use]
    pub fn time_slice(&self, time: u64, offset: i64) -> u64 {
        (time / self.config.period).saturating_add_signed(offset)
    }

    /// Compute the code that is valid at the given Unix `time`.
    pub fn code_at(&self, secret: &str, time: u64) -> Result<OtpCode, Error> {
        let key = Key::from_base32(secret)?;
        self.code_for_slice(&key, self.time_slice(time, 0))
    }

    /// Check whether `code` is valid at `time`, accepting codes from up to `discrepancy` time
    /// steps before or after it.
    ///
    /// Every candidate is computed and compared in constant time, independent of whether and
    /// where a match occurs.
    pub fn verify_at(
        &self,
        secret: &str,
        code: &str,
        discrepancy: u32,
        time: u64,
    ) -> Result<bool, Error> {
        let key = Key::from_base32(secret)?;
        let discrepancy = i64::from(discrepancy);
        let mut matched = Choice::from(0);

        for offset in -discrepancy..=discrepancy {
            let expected = self
                .code_for_slice(&key, self.time_slice(time, offset))?
                .to_string();
            matched |= expected.as_bytes().ct_eq(code.as_bytes());
        }

        let valid = bool::from(matched);
        debug!(discrepancy, valid, "verified code");

        Ok(valid)
    }

    /// Create the provisioning URI for an account with the given `label` and `secret`.
    #[must_use]
    pub fn provisioning_uri(&self, label: &str, secret: &str) -> ProvisioningUri {
        ProvisioningUri {
            label: label.to_owned(),
            secret: secret.to_owned(),
            issuer: self.config.issuer.clone(),
            period: self.config.period,
            algorithm: self.config.algorithm,
            digits: self.config.digits,
        }
    }

    fn code_for_slice(&self, key: &Key, counter: u64) -> Result<OtpCode, Error> {
        hotp(key, counter, self.config.digits, self.config.algorithm)
    }
}

impl From<&ProvisioningUri> for Config {
    fn from(uri: &ProvisioningUri) -> Self {
        Self {
            digits: uri.digits,
            period: uri.period,
            algorithm: uri.algorithm,
            issuer: uri.issuer.clone(),
        }
    }
}
