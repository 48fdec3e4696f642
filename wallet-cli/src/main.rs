// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # QCC Wallet
//!
//! Entry point for the `qcc-wallet` binary. Parses CLI arguments,
//! initializes logging, runs one command and prints its JSON result.
//!
//! - `create` / `restore` / `inspect`: wallet identities
//! - `sign-send` / `sign-transfer`: signed broadcast envelopes
//! - `verify`: endpoint-side envelope checks
//! - `to-base-units` / `from-base-units`
//! - `keyfile export` / `keyfile import`
//! - `version`

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use qcc_protocol::clock::SystemClock;

use cli::{Commands, KeyfileCommands, QccWalletCli};

fn main() -> Result<()> {
    let cli = QccWalletCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let output = match cli.command {
        Commands::Create(args) => commands::create(args)?,
        Commands::Restore(args) => commands::restore(args)?,
        Commands::Inspect(args) => commands::inspect(args)?,
        Commands::SignSend(args) => commands::sign_send(args, SystemClock)?,
        Commands::SignTransfer(args) => commands::sign_transfer(args, SystemClock)?,
        Commands::Verify(args) => commands::verify(args)?,
        Commands::ToBaseUnits(args) => commands::to_base(args)?,
        Commands::FromBaseUnits(args) => commands::from_base(args)?,
        Commands::Keyfile(KeyfileCommands::Export(args)) => {
            commands::export_keyfile(args, SystemClock)?
        }
        Commands::Keyfile(KeyfileCommands::Import(args)) => {
            commands::import_keyfile(args, SystemClock)?
        }
        Commands::Version => commands::version(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
