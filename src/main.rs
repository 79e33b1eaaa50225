use std::io::{self, BufRead, Read};

use anyhow::{Context, Result, bail};
use clap::Parser;
use futures::executor::block_on;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use safeparts_client::cli::{Cli, Commands};
use safeparts_client::domain::{Encoding, ShareCount, SplitConfig, Threshold};
use safeparts_client::{
    ClientConfig, CombineForm, Engine, ErrorKind, LocalEngine, OperationState, SplitForm, classify,
    parse_shares,
};

/// Read a secret securely from stdin (hidden input when TTY available)
fn read_secret() -> Result<Zeroizing<String>> {
    if atty::is(atty::Stream::Stdin) {
        eprintln!("Enter the secret to split:");
        return rpassword::read_password()
            .map(Zeroizing::new)
            .context("Failed to read secret from stdin");
    }

    // Piped input: everything up to EOF, minus the trailing newline
    let mut secret = Zeroizing::new(String::new());
    io::stdin()
        .read_to_string(&mut secret)
        .context("Failed to read secret from stdin")?;
    let trimmed_len = secret.trim_end_matches(['\r', '\n']).len();
    secret.truncate(trimmed_len);
    Ok(secret)
}

/// Read blank-line separated shares from stdin
///
/// Interactive input ends at two consecutive empty lines; piped input at EOF.
fn read_share_text() -> Result<Zeroizing<String>> {
    let mut text = Zeroizing::new(String::new());

    if atty::is(atty::Stream::Stdin) {
        eprintln!("Enter shares separated by an empty line; finish with two empty lines:");
        let mut empty_run = 0;
        loop {
            let line = Zeroizing::new(
                rpassword::read_password().context("Failed to read share from stdin")?,
            );
            if line.trim().is_empty() {
                empty_run += 1;
                if empty_run == 2 {
                    break;
                }
            } else {
                empty_run = 0;
            }
            text.push_str(&line);
            text.push('\n');
        }
    } else {
        for line in io::stdin().lock().lines() {
            let line = Zeroizing::new(line.context("Failed to read line from stdin")?);
            text.push_str(&line);
            text.push('\n');
        }
    }

    if text.trim().is_empty() {
        bail!("No shares provided");
    }
    Ok(text)
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn split(
    engine: &LocalEngine,
    threshold: Threshold,
    shares: ShareCount,
    encoding: Encoding,
) -> Result<()> {
    let split_config = SplitConfig::new(threshold, shares)?;
    let secret = read_secret()?;

    let config = ClientConfig {
        default_encoding: encoding,
        ..ClientConfig::default()
    };
    let mut form = SplitForm::new(&config);
    form.set_secret(&secret);
    form.set_parameters(
        u32::from(*split_config.threshold()),
        u32::from(*split_config.share_count()),
    );
    if !form.can_split() {
        bail!("Secret must not be empty");
    }

    block_on(form.split(engine));
    match form.state() {
        OperationState::Succeeded(shares) => {
            println!("{}", shares.join("\n\n"));
            Ok(())
        }
        OperationState::Failed { kind, .. } => bail!("{kind}"),
        _ => bail!("Split did not complete"),
    }
}

fn combine(engine: &LocalEngine, encoding: Option<Encoding>) -> Result<()> {
    let text = read_share_text()?;

    let mut form = CombineForm::new(ClientConfig::default());
    let Some(first) = form.collection().boxes().first().map(|b| b.id()) else {
        bail!("No share boxes available");
    };
    let added = block_on(form.on_paste(engine, first, &text));
    if !added.is_empty() {
        tracing::info!(boxes = form.collection().len(), "share threshold read from input");
    }
    if let Some(encoding) = encoding {
        form.set_encoding(encoding);
    }

    block_on(form.combine(engine));
    match form.state() {
        OperationState::Succeeded(_) => {
            let secret = Zeroizing::new(form.secret_text().unwrap_or_default());
            println!("{}", &*secret);
            Ok(())
        }
        OperationState::Failed { kind, .. } => match kind {
            ErrorKind::NotEnoughShares { need, got } => {
                bail!("{kind} ({} more needed)", need.saturating_sub(*got))
            }
            _ => bail!("{kind}"),
        },
        _ => bail!("No shares provided"),
    }
}

fn detect() -> Result<()> {
    let mut text = Zeroizing::new(String::new());
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    match classify(&text) {
        Some(encoding) => println!("{encoding}"),
        None => println!("unknown"),
    }
    Ok(())
}

fn inspect(engine: &LocalEngine, encoding: Option<Encoding>) -> Result<()> {
    let text = read_share_text()?;
    let Some(share) = parse_shares(&text).into_iter().next() else {
        bail!("No shares provided");
    };
    let encoding = encoding.or_else(|| classify(&share)).unwrap_or_default();

    let info = block_on(engine.inspect_share(&share, encoding))
        .map_err(|e| anyhow::anyhow!("{}", safeparts_client::translate(e.message())))?;
    println!("{}", info.k);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    // The CLI always runs the in-process engine
    let engine = LocalEngine::new();

    match cli.command {
        Commands::Split {
            threshold,
            shares,
            encoding,
        } => split(&engine, threshold, shares, encoding)?,
        Commands::Combine { encoding } => combine(&engine, encoding)?,
        Commands::Detect => detect()?,
        Commands::Inspect { encoding } => inspect(&engine, encoding)?,
    }

    Ok(())
}
