extern crate peicon;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use peicon::{ico, pe::locator::ResourceLocator, File, IconExtractor};
use std::{fs, hint::black_box, path::PathBuf};

/// Full pipeline and its stages on the sample images.
///
/// Files are loaded into memory once, so the numbers exclude mapping and disk I/O.
fn bench_extract(c: &mut Criterion) {
    for name in ["pe32_dib.exe", "pe64_png.exe"] {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/samples")
            .join(name);
        let data = fs::read(&path).expect("Failed to read sample");
        let file = File::from_mem(data.clone()).expect("Failed to load sample");
        let extractor = IconExtractor::new();

        let mut group = c.benchmark_group(name);
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_function("locate", |b| {
            b.iter(|| black_box(ResourceLocator::locate(black_box(&file)).unwrap()));
        });

        group.bench_function("extract", |b| {
            b.iter(|| black_box(extractor.extract(black_box(&file)).unwrap()));
        });

        let icon = extractor.extract(&file).unwrap();
        group.bench_function("to_image_bytes", |b| {
            b.iter(|| black_box(icon.to_image_bytes().unwrap()));
        });

        group.finish();
    }
}

/// ICO reconstruction for a 256x256 32bpp payload.
fn bench_reconstruct(c: &mut Criterion) {
    let payload = vec![0x7F_u8; 40 + 256 * 256 * 4 + 256 * 32];

    let mut group = c.benchmark_group("ico");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("reconstruct", |b| {
        b.iter(|| black_box(ico::reconstruct(black_box(&payload)).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_extract, bench_reconstruct);
criterion_main!(benches);
