//! # Bit Buffer Benchmark
//!
//! Hot paths of a snapshot send: many small unsigned fields, coordinates,
//! and bulk bit copies at aligned and unaligned offsets.
//!
//! Run with: `cargo bench --package wirebits_codec`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wirebits_codec::{init_masks, BitReader, BitWriter, CoordPrecision, WordBuffer};
use wirebits_shared::MAX_PACKET_SIZE;

/// Fields per packet in the unsigned benchmarks.
const FIELD_COUNT: usize = 512;

/// Deterministic `(value, bits)` pairs that fit one packet.
fn random_fields(seed: u64) -> Vec<(u32, u32)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..FIELD_COUNT)
        .map(|_| (rng.gen::<u32>(), rng.gen_range(1..=16)))
        .collect()
}

fn random_coords(seed: u64, count: usize) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen_range(-16000.0..16000.0)).collect()
}

/// Benchmark: Pack and unpack a packet of small unsigned fields.
fn bench_unsigned_fields(c: &mut Criterion) {
    init_masks();
    let fields = random_fields(7);
    let total_bits: u64 = fields.iter().map(|&(_, bits)| u64::from(bits)).sum();
    let mut storage = WordBuffer::with_capacity_bytes(MAX_PACKET_SIZE);

    let mut group = c.benchmark_group("unsigned_fields");
    group.throughput(Throughput::Bytes(total_bits / 8));

    group.bench_function("write", |b| {
        b.iter(|| {
            let mut writer = BitWriter::new(storage.as_bytes_mut());
            for &(value, bits) in &fields {
                writer.write_unsigned(black_box(value), bits);
            }
            black_box(writer.num_bits_written())
        });
    });

    let mut writer = BitWriter::new(storage.as_bytes_mut());
    for &(value, bits) in &fields {
        writer.write_unsigned(value, bits);
    }

    group.bench_function("read", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(storage.as_bytes());
            let mut acc = 0u32;
            for &(_, bits) in &fields {
                acc ^= reader.read_unsigned(bits);
            }
            black_box(acc)
        });
    });

    group.finish();
}

/// Benchmark: Coordinate encodings.
fn bench_coords(c: &mut Criterion) {
    let coords = random_coords(11, 256);
    let mut storage = WordBuffer::with_capacity_bytes(MAX_PACKET_SIZE * 2);

    let mut group = c.benchmark_group("coords");
    group.bench_function("write_coord", |b| {
        b.iter(|| {
            let mut writer = BitWriter::new(storage.as_bytes_mut());
            for &value in &coords {
                writer.write_coord(black_box(value));
            }
            black_box(writer.num_bits_written())
        });
    });

    for precision in [CoordPrecision::Integral, CoordPrecision::LowPrecision, CoordPrecision::Full] {
        group.bench_with_input(
            BenchmarkId::new("write_coord_mp", format!("{precision:?}")),
            &precision,
            |b, &precision| {
                b.iter(|| {
                    let mut writer = BitWriter::new(storage.as_bytes_mut());
                    for &value in &coords {
                        writer.write_coord_mp(black_box(value), precision);
                    }
                    black_box(writer.num_bits_written())
                });
            },
        );
    }
    group.finish();
}

/// Benchmark: Bulk copies, byte aligned versus shifted.
fn bench_write_bits(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let payload: Vec<u8> = (0..1024).map(|_| rng.gen()).collect();
    let mut storage = WordBuffer::with_capacity_bytes(payload.len() + 8);

    let mut group = c.benchmark_group("write_bits");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for offset in [0u32, 3] {
        group.bench_with_input(BenchmarkId::from_parameter(offset), &offset, |b, &offset| {
            b.iter(|| {
                let mut writer = BitWriter::new(storage.as_bytes_mut());
                writer.write_unsigned(0, offset);
                black_box(writer.write_bits(&payload, payload.len() * 8))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_unsigned_fields, bench_coords, bench_write_bits);
criterion_main!(benches);
