// Signing & verification benchmarks for the QCC signing core.
//
// Covers keypair derivation from a phrase, canonical hashing, envelope
// signing and verification, and batch verification at various sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use qcc_protocol::clock::FixedClock;
use qcc_protocol::crypto::hash::{hash, tx_hash};
use qcc_protocol::crypto::keys::Keypair;
use qcc_protocol::crypto::signatures::{batch_verify, sign_message};
use qcc_protocol::identity::WalletIdentity;
use qcc_protocol::transaction::{verify_envelope, Signer, TransactionBuilder};

const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                       abandon abandon abandon abandon abandon about";
const RECIPIENT: &str = "9d2fdce4c234c11b89484624934c181a2b13ce451a70";

fn bench_restore_from_mnemonic(c: &mut Criterion) {
    c.bench_function("identity/restore_mnemonic", |b| {
        b.iter(|| WalletIdentity::restore(ABANDON).unwrap());
    });
}

fn bench_canonical_hash(c: &mut Criterion) {
    let payload = json!({
        "type": "Send",
        "to": RECIPIENT,
        "amount": "1500000000000000000",
        "timestamp": 1_700_000_000_000_000u64,
        "from": "3d64dbc4b1ba36651c7d0304cb5f5bc077550bc48ee3",
    });

    c.bench_function("hash/canonical_payload", |b| {
        b.iter(|| hash(&payload));
    });
    c.bench_function("hash/tx_hash", |b| {
        b.iter(|| tx_hash(&payload, 1_700_000_000_000_000));
    });
}

fn bench_sign_transaction(c: &mut Criterion) {
    let keypair = Keypair::generate();
    let private_key = keypair.private_key_hex();
    let signer = Signer::with_clock(FixedClock(1_700_000_000_000_000));
    let tx = TransactionBuilder::send(RECIPIENT)
        .amount_tokens("1.5")
        .build()
        .unwrap();

    c.bench_function("envelope/sign_transaction", |b| {
        b.iter(|| signer.sign_transaction(&tx, &private_key).unwrap());
    });

    let envelope = signer.sign_transaction(&tx, &private_key).unwrap();
    c.bench_function("envelope/verify", |b| {
        b.iter(|| verify_envelope(&envelope).unwrap());
    });
}

fn bench_batch_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("ed25519/batch_verify");

    for size in [10, 50, 100, 500] {
        let items: Vec<_> = (0..size)
            .map(|i| {
                let kp = Keypair::generate();
                let msg = format!("{:014x}{}", i, "ab".repeat(32));
                let sig = sign_message(&kp, &msg);
                (kp.public_key(), msg, sig)
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| batch_verify(items).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_restore_from_mnemonic,
    bench_canonical_hash,
    bench_sign_transaction,
    bench_batch_verify,
);
criterion_main!(benches);
