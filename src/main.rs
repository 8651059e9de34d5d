#![deny(rust_2018_idioms, clippy::all, clippy::pedantic)]

use std::{io, str};

use anyhow::{ensure, Context, Result};
use provider_qrcode::{SvgRenderer, UnicodeRenderer};
use provider_rand::{OsEntropy, SeededEntropy};
use provider_time::SystemClock;
use totem_core::provider::QrRenderer;
use totem_gen::{Authenticator, Config, ProvisioningUri, Totp};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, Opt, QrFormat};

mod cli;

fn main() -> Result<()> {
    let opt = Opt::parse();
    init_logging(opt.verbose);

    let config = Config::from(opt.settings);

    match opt.cmd {
        Command::Secret { bits, seed } => secret(bits, seed),
        Command::Code { secret, time } => code(config, &secret, time),
        Command::Verify {
            secret,
            code,
            discrepancy,
            time,
        } => verify(config, &secret, &code, discrepancy, time),
        Command::Uri { label, secret } => uri(config, &label, &secret),
        Command::Qr {
            label,
            secret,
            format,
            size,
        } => qr(config, &label, &secret, format, size),
        Command::Inspect { uri, time } => inspect(&uri, time),
        Command::Completions { shell } => cli::completions(shell),
        Command::Manpages { dir } => cli::manpages(&dir),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(level)
        .init();
}

fn authenticator<R: QrRenderer>(
    config: Config,
    renderer: R,
) -> Result<Authenticator<OsEntropy, SystemClock, R>> {
    Authenticator::new(config, OsEntropy, SystemClock, renderer).context("invalid settings")
}

fn secret(bits: u32, seed: Option<u64>) -> Result<()> {
    let secret = match seed {
        Some(seed) => totem_gen::create_secret(&SeededEntropy::new(seed), bits, false)?,
        None => totem_gen::create_secret(&OsEntropy, bits, true)?,
    };

    println!("{secret}");

    Ok(())
}

fn code(config: Config, secret: &str, time: Option<u64>) -> Result<()> {
    let code = authenticator(config, SvgRenderer)?.code(secret, time)?;
    println!("{code}");

    Ok(())
}

fn verify(
    config: Config,
    secret: &str,
    code: &str,
    discrepancy: u32,
    time: Option<u64>,
) -> Result<()> {
    let valid =
        authenticator(config, SvgRenderer)?.verify_code(secret, code, Some(discrepancy), time)?;

    ensure!(valid, "the code is not valid");
    println!("valid");

    Ok(())
}

fn uri(config: Config, label: &str, secret: &str) -> Result<()> {
    let uri = Totp::new(config)?.provisioning_uri(label, secret);
    println!("{uri}");

    Ok(())
}

fn qr(config: Config, label: &str, secret: &str, format: QrFormat, size: u32) -> Result<()> {
    match format {
        QrFormat::DataUri => {
            let data_uri =
                authenticator(config, SvgRenderer)?.qr_code_data_uri(label, secret, Some(size))?;
            println!("{data_uri}");
        }
        QrFormat::Terminal => {
            let uri = Totp::new(config)?.provisioning_uri(label, secret).to_string();
            let image = UnicodeRenderer.render(&uri, size)?;
            println!("{}", str::from_utf8(&image.data)?);
        }
    }

    Ok(())
}

fn inspect(uri: &str, time: Option<u64>) -> Result<()> {
    let uri = uri
        .parse::<ProvisioningUri>()
        .context("failed parsing the provisioning URI")?;
    let auth = authenticator(Config::from(&uri), SvgRenderer)?;
    let code = auth.code(&uri.secret, time)?;

    println!(
        "{} ({})",
        uri.issuer.as_deref().unwrap_or_default(),
        uri.label
    );
    println!(
        "{}, {} digits, {}s period",
        uri.algorithm, uri.digits, uri.period
    );
    println!("{code}");

    Ok(())
}
