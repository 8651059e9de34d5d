use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use totem_gen::{
    Algorithm, Config, DEFAULT_DIGITS, DEFAULT_DISCREPANCY, DEFAULT_PERIOD, DEFAULT_QR_SIZE,
    DEFAULT_SECRET_BITS,
};

#[derive(Parser)]
#[command(about, author, version, propagate_version = true)]
pub struct Opt {
    /// Increase log output, can be repeated up to three times.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(flatten)]
    pub settings: Settings,
    #[command(subcommand)]
    pub cmd: Command,
}

impl Opt {
    pub fn parse() -> Self {
        <Opt as Parser>::parse()
    }
}

/// Settings for code generation, shared by all commands.
#[derive(Args)]
pub struct Settings {
    /// Amount of digits per code.
    #[arg(long, global = true, default_value_t = DEFAULT_DIGITS)]
    pub digits: u8,
    /// Seconds that a single code is valid.
    #[arg(long, global = true, default_value_t = DEFAULT_PERIOD)]
    pub period: u64,
    /// Hash algorithm, one of `sha1`, `sha256` or `sha512`.
    #[arg(long, global = true, default_value_t = Algorithm::Sha1)]
    pub algorithm: Algorithm,
    /// Issuer that is shown next to the account in authenticator apps.
    #[arg(long, global = true)]
    pub issuer: Option<String>,
}

impl From<Settings> for Config {
    fn from(settings: Settings) -> Self {
        Self {
            digits: settings.digits,
            period: settings.period,
            algorithm: settings.algorithm,
            issuer: settings.issuer,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new random secret.
    Secret {
        /// Minimum entropy of the secret in bits.
        #[arg(short, long, default_value_t = DEFAULT_SECRET_BITS)]
        bits: u32,
        /// Use a deterministic generator with the given seed instead of the system's secure
        /// randomness. Only meant for testing, never use the result for a real account.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the code for a secret.
    Code {
        /// Base32 encoded secret.
        secret: String,
        /// Unix timestamp to create the code for, instead of the current time.
        #[arg(short, long)]
        time: Option<u64>,
    },
    /// Check whether a code is valid for a secret.
    Verify {
        /// Base32 encoded secret.
        secret: String,
        /// The code to check.
        code: String,
        /// Amount of time steps before and after the current one that are accepted as well.
        #[arg(short, long, default_value_t = DEFAULT_DISCREPANCY)]
        discrepancy: u32,
        /// Unix timestamp to verify the code at, instead of the current time.
        #[arg(short, long)]
        time: Option<u64>,
    },
    /// Print the provisioning URI for an account.
    Uri {
        /// Label of the account, like an email address.
        label: String,
        /// Base32 encoded secret.
        secret: String,
    },
    /// Render the provisioning URI of an account as QR code.
    Qr {
        /// Label of the account, like an email address.
        label: String,
        /// Base32 encoded secret.
        secret: String,
        /// Output format of the QR code.
        #[arg(short, long, value_enum, default_value_t = QrFormat::DataUri)]
        format: QrFormat,
        /// Minimum edge length of the image in pixels.
        #[arg(short, long, default_value_t = DEFAULT_QR_SIZE)]
        size: u32,
    },
    /// Show the account details and current code of a provisioning URI.
    Inspect {
        /// The `otpauth://totp/` URI to inspect.
        uri: String,
        /// Unix timestamp to create the code for, instead of the current time.
        #[arg(short, long)]
        time: Option<u64>,
    },
    /// Generate auto-completion scripts for various shells.
    Completions {
        /// Shell to generate an auto-completion script for.
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Generate man pages into the given directory.
    Manpages {
        /// Target directory, that must already exist and be empty. If the any file with the same
        /// name as any of the man pages already exist, it'll not be overwritten, but instead an
        /// error be returned.
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },
}

/// Possible output formats for QR codes.
#[derive(Clone, Copy, ValueEnum)]
pub enum QrFormat {
    /// SVG image wrapped in a `data:` URI, for embedding in web pages.
    DataUri,
    /// Block characters, for scanning straight from the terminal.
    Terminal,
}

#[allow(clippy::unnecessary_wraps)]
pub fn completions(shell: Shell) -> Result<()> {
    clap_complete::generate(
        shell,
        &mut Opt::command(),
        env!("CARGO_PKG_NAME"),
        &mut io::stdout().lock(),
    );
    Ok(())
}

pub fn manpages(dir: &Path) -> Result<()> {
    fn print(dir: &Path, app: &clap::Command) -> Result<()> {
        let name = app.get_display_name().unwrap_or_else(|| app.get_name());
        let out = dir.join(format!("{name}.1"));
        let mut out = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&out)
            .with_context(|| format!("the file `{}` already exists", out.display()))?;

        clap_mangen::Man::new(app.clone()).render(&mut out)?;
        out.flush()?;

        for sub in app.get_subcommands() {
            print(dir, sub)?;
        }

        Ok(())
    }

    ensure!(dir.try_exists()?, "target directory doesn't exist");

    let mut app = Opt::command();
    app.build();

    print(dir, &app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Opt::command().debug_assert();
    }

    #[test]
    fn settings_into_config() {
        let opt = Opt::try_parse_from([
            "totem",
            "code",
            "VMR466AB62ZBOKHE",
            "--digits",
            "8",
            "--algorithm",
            "sha256",
        ])
        .unwrap();
        let config = Config::from(opt.settings);

        assert_eq!(8, config.digits);
        assert_eq!(DEFAULT_PERIOD, config.period);
        assert_eq!(Algorithm::Sha256, config.algorithm);
        assert_eq!(None, config.issuer);
    }

    #[test]
    fn unknown_algorithm_rejected() {
        assert!(Opt::try_parse_from(["totem", "--algorithm", "md5", "code", "MZXW6"]).is_err());
    }
}
