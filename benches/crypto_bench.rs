//! Benchmarks for key handling and streaming encryption.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pgp_encrypt::{Encrypter, PgpEncrypter, Profile};

fn bench_key_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_generation");
    group.sample_size(20);
    group.bench_function("curve25519_legacy", |b| {
        b.iter(|| {
            PgpEncrypter::generate_with_profile(
                "Bench",
                "bench@example.com",
                Profile::Curve25519Legacy,
            )
        })
    });

    group.finish();
}

fn bench_key_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_loading");
    let encrypter = PgpEncrypter::generate("Bench", "bench@example.com").unwrap();

    let mut binary = Vec::new();
    encrypter.write_private_key(&mut binary).unwrap();
    let mut armored = Vec::new();
    encrypter.write_armored_private_key(&mut armored).unwrap();

    group.bench_function("binary", |b| {
        b.iter(|| PgpEncrypter::from_reader(black_box(&binary[..])))
    });
    group.bench_function("armored", |b| {
        b.iter(|| PgpEncrypter::from_reader(black_box(&armored[..])))
    });

    group.finish();
}

fn bench_encryption_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("encryption_operations");
    let encrypter = PgpEncrypter::generate("Bench", "bench@example.com").unwrap();

    for size in [64usize, 1024, 64 * 1024, 1024 * 1024] {
        let message = vec![0u8; size];

        let mut encrypted = Vec::new();
        encrypter
            .encrypt(&mut &message[..], &mut encrypted)
            .unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encrypt", size), &message, |b, message| {
            b.iter(|| {
                let mut out = Vec::with_capacity(size + 512);
                encrypter.encrypt(&mut &message[..], &mut out).unwrap();
                out
            })
        });
        group.bench_with_input(
            BenchmarkId::new("decrypt", size),
            &encrypted,
            |b, encrypted| b.iter(|| encrypter.decrypt(&mut &encrypted[..]).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_key_generation,
    bench_key_loading,
    bench_encryption_operations
);
criterion_main!(benches);
