//! Command handlers. Each returns the JSON document `main` prints.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use qcc_protocol::amount::{from_base_units, to_base_units};
use qcc_protocol::clock::Clock;
use qcc_protocol::config::LEGACY_KEYFILE_PASSPHRASE;
use qcc_protocol::identity::{truncate_address, WalletIdentity};
use qcc_protocol::keyfile::{has_keyfile_extension, KeyFile};
use qcc_protocol::transaction::{verify_envelope, SignedEnvelope, Signer, TransactionBuilder};

use crate::cli::{
    CreateArgs, ExportArgs, FromBaseUnitsArgs, ImportArgs, KeyArgs, RestoreArgs, SignArgs,
    SignTransferArgs, ToBaseUnitsArgs, VerifyArgs,
};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

pub fn create(args: CreateArgs) -> Result<Value> {
    let identity = WalletIdentity::create(args.words)
        .with_context(|| format!("failed to create a {}-word wallet", args.words))?;
    tracing::info!(address = %identity.address, "wallet created");
    Ok(identity_json(&identity))
}

pub fn restore(args: RestoreArgs) -> Result<Value> {
    let identity = WalletIdentity::restore(&args.mnemonic).context("failed to restore wallet")?;
    Ok(identity_json(&identity))
}

pub fn inspect(args: KeyArgs) -> Result<Value> {
    let identity =
        WalletIdentity::from_private_key(&args.private_key).context("invalid private key")?;
    Ok(json!({
        "public_key": identity.public_key,
        "address": identity.address,
        "short_address": truncate_address(&identity.address),
    }))
}

fn identity_json(identity: &WalletIdentity) -> Value {
    json!({
        "mnemonic": identity.mnemonic,
        "private_key": identity.private_key,
        "public_key": identity.public_key,
        "address": identity.address,
    })
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

pub fn sign_send(args: SignArgs, clock: impl Clock) -> Result<Value> {
    let builder = TransactionBuilder::send(&args.to);
    sign(builder, args, clock)
}

pub fn sign_transfer(args: SignTransferArgs, clock: impl Clock) -> Result<Value> {
    let builder = TransactionBuilder::transfer(&args.sign.to, &args.token);
    sign(builder, args.sign, clock)
}

fn sign(builder: TransactionBuilder, args: SignArgs, clock: impl Clock) -> Result<Value> {
    let builder = if args.base_units {
        builder.amount_base_units(&args.amount)
    } else {
        builder.amount_tokens(&args.amount)
    };
    let builder = match args.timestamp {
        Some(ts) => builder.timestamp(ts),
        None => builder,
    };
    let tx = builder.build().context("invalid transaction")?;

    let envelope = Signer::with_clock(clock)
        .sign_transaction(&tx, &args.key.private_key)
        .context("failed to sign transaction")?;
    tracing::info!(
        from = envelope.from_address().unwrap_or_default(),
        to = %tx.to,
        amount = %tx.amount,
        "transaction signed"
    );
    Ok(serde_json::to_value(&envelope)?)
}

pub fn verify(args: VerifyArgs) -> Result<Value> {
    let text = if args.envelope == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read envelope from stdin")?;
        buf
    } else {
        args.envelope
    };
    let envelope = SignedEnvelope::from_json(&text).context("envelope is not valid JSON")?;

    Ok(match verify_envelope(&envelope) {
        Ok(()) => json!({
            "valid": true,
            "from": envelope.from_address(),
            "timestamp": envelope.timestamp(),
        }),
        Err(err) => json!({ "valid": false, "error": err.to_string() }),
    })
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

pub fn to_base(args: ToBaseUnitsArgs) -> Result<Value> {
    let base = to_base_units(&args.amount)
        .with_context(|| format!("cannot convert {:?}", args.amount))?;
    Ok(json!({ "amount": args.amount, "base_units": base.to_string() }))
}

pub fn from_base(args: FromBaseUnitsArgs) -> Result<Value> {
    let display = from_base_units(&args.base_units, args.places)
        .with_context(|| format!("cannot convert {:?}", args.base_units))?;
    Ok(json!({ "base_units": args.base_units, "amount": display }))
}

// ---------------------------------------------------------------------------
// Key files
// ---------------------------------------------------------------------------

pub fn export_keyfile(args: ExportArgs, clock: impl Clock) -> Result<Value> {
    let identity = match (&args.mnemonic, &args.private_key) {
        (Some(phrase), _) => WalletIdentity::restore(phrase).context("failed to restore wallet")?,
        (None, Some(key)) => WalletIdentity::from_private_key(key).context("invalid private key")?,
        (None, None) => bail!("either --private-key or --mnemonic is required"),
    };
    if args.passphrase == LEGACY_KEYFILE_PASSPHRASE {
        tracing::warn!("exporting with the public legacy passphrase; the file is not protected");
    }

    let file = KeyFile::from_identity(&identity, &clock);
    let sealed = file.encrypt(&args.passphrase)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let path = args.out_dir.join(file.suggested_file_name());
    write_private(&path, &sealed)?;
    tracing::info!(path = %path.display(), address = %identity.address, "key file written");

    Ok(json!({ "path": path.display().to_string(), "address": identity.address }))
}

pub fn import_keyfile(args: ImportArgs, clock: impl Clock) -> Result<Value> {
    if !has_keyfile_extension(&args.path.to_string_lossy()) {
        tracing::warn!(path = %args.path.display(), "file does not have a .qcc extension");
    }
    let sealed = fs::read_to_string(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;

    let passphrase = args.passphrase.as_deref().unwrap_or(LEGACY_KEYFILE_PASSPHRASE);
    let file = KeyFile::decrypt(sealed.trim(), passphrase, &clock)
        .with_context(|| format!("failed to open {}", args.path.display()))?;
    let identity = file.to_identity()?;

    let exported_at = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(file.timestamp as i64)
        .map(|t| t.to_rfc3339());
    let mut out = identity_json(&identity);
    out["exported_at"] = json!(exported_at);
    Ok(out)
}

/// Writes `contents` to `path`, readable only by the owner on Unix.
fn write_private(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

pub fn version() -> Value {
    json!({
        "qcc-wallet": env!("CARGO_PKG_VERSION"),
        "rustc": option_env!("RUSTC_VERSION").unwrap_or("unknown"),
    })
}
