//! # CLI Interface
//!
//! Defines the command-line argument structure for `qcc-wallet` using
//! `clap` derive. Secrets can come from the environment so they stay out of
//! shell history.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// QCC wallet.
///
/// Creates and restores wallets, signs Send and Transfer requests for the
/// broadcast endpoint, and reads and writes `.qcc` key files. Every command
/// prints JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "qcc-wallet",
    about = "QCC wallet signing tool",
    version,
    propagate_version = true
)]
pub struct QccWalletCli {
    /// Log output format.
    #[arg(long, global = true, env = "QCC_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "qcc_wallet=warn,qcc_protocol=warn")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a wallet from a fresh mnemonic.
    Create(CreateArgs),
    /// Restore a wallet from its mnemonic.
    Restore(RestoreArgs),
    /// Show the public key and address of a private key.
    Inspect(KeyArgs),
    /// Sign a native coin Send.
    SignSend(SignArgs),
    /// Sign a token Transfer.
    SignTransfer(SignTransferArgs),
    /// Check a signed envelope the way the broadcast endpoint does.
    Verify(VerifyArgs),
    /// Convert a token amount to base units.
    ToBaseUnits(ToBaseUnitsArgs),
    /// Convert base units to a display amount.
    FromBaseUnits(FromBaseUnitsArgs),
    /// Export or import an encrypted key file.
    #[command(subcommand)]
    Keyfile(KeyfileCommands),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Mnemonic length: 12, 15, 18, 21 or 24 words.
    #[arg(long, short = 'w', default_value_t = 12)]
    pub words: usize,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// The BIP-39 phrase, space separated.
    #[arg(long, short = 'm', env = "QCC_MNEMONIC", hide_env_values = true)]
    pub mnemonic: String,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Hex-encoded private key.
    #[arg(long, short = 'k', env = "QCC_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Recipient address.
    #[arg(long)]
    pub to: String,

    /// Amount in tokens, e.g. `1.5` or `2e-3`.
    #[arg(long)]
    pub amount: String,

    /// Treat `--amount` as base units instead of tokens.
    #[arg(long)]
    pub base_units: bool,

    /// Timestamp in microseconds, normally read from the server's `/api/ts`.
    /// When omitted the local clock is used.
    #[arg(long)]
    pub timestamp: Option<u64>,
}

#[derive(Args, Debug)]
pub struct SignTransferArgs {
    #[command(flatten)]
    pub sign: SignArgs,

    /// Token contract address.
    #[arg(long)]
    pub token: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Envelope JSON, or `-` to read it from stdin.
    pub envelope: String,
}

#[derive(Args, Debug)]
pub struct ToBaseUnitsArgs {
    pub amount: String,
}

#[derive(Args, Debug)]
pub struct FromBaseUnitsArgs {
    pub base_units: String,

    /// Decimal places to round to.
    #[arg(long, default_value_t = 6)]
    pub places: u32,
}

#[derive(Subcommand, Debug)]
pub enum KeyfileCommands {
    /// Encrypt a wallet into `<address>.qcc`.
    Export(ExportArgs),
    /// Decrypt a key file and show the wallet it holds.
    Import(ImportArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Hex-encoded private key. Mutually exclusive with `--mnemonic`.
    #[arg(long, short = 'k', env = "QCC_PRIVATE_KEY", hide_env_values = true, conflicts_with = "mnemonic")]
    pub private_key: Option<String>,

    /// Mnemonic to export; it is stored in the file alongside the key.
    #[arg(long, short = 'm', env = "QCC_MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// Passphrase to seal the file with.
    #[arg(long, env = "QCC_KEYFILE_PASSPHRASE", hide_env_values = true)]
    pub passphrase: String,

    /// Directory to write the key file into.
    #[arg(long, short = 'o', default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the `.qcc` file.
    pub path: PathBuf,

    /// Passphrase the file was sealed with. Files from the web wallet open
    /// without one.
    #[arg(long, env = "QCC_KEYFILE_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        QccWalletCli::command().debug_assert();
    }

    #[test]
    fn parses_sign_transfer() {
        let cli = QccWalletCli::try_parse_from([
            "qcc-wallet",
            "--log-format",
            "json",
            "sign-transfer",
            "--private-key",
            "00",
            "--to",
            "abc",
            "--amount",
            "1.5",
            "--token",
            "tok",
            "--timestamp",
            "42",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Commands::SignTransfer(args) => {
                assert_eq!(args.token, "tok");
                assert_eq!(args.sign.timestamp, Some(42));
                assert!(!args.sign.base_units);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
