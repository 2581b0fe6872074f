use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, ImageFormat, RgbImage};
use preprocess::{InputKind, RawImage, TensorNormalizer, normalize};
use std::io::Cursor;

/// Create raw pixel buffer for benchmarking (gradient pattern)
fn create_test_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = vec![0u8; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            pixels[idx] = (x % 256) as u8;
            pixels[idx + 1] = (y % 256) as u8;
            pixels[idx + 2] = ((x + y) % 256) as u8;
        }
    }
    pixels
}

fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_raw(width, height, create_test_pixels(width, height))
        .expect("pixel buffer matches dimensions");
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf
}

fn benchmark_resize_and_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_and_scale");
    let normalizer = TensorNormalizer::default();

    for (width, height) in [(640, 480), (1280, 720), (1920, 1080), (3840, 2160)] {
        let pixels = create_test_pixels(width, height);

        group.bench_with_input(
            BenchmarkId::new("rgb", format!("{}x{}", width, height)),
            &pixels,
            |b, pixels| {
                b.iter(|| {
                    normalizer
                        .normalize_rgb(black_box(pixels), black_box(width), black_box(height))
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

fn benchmark_full_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for (width, height) in [(640, 480), (1920, 1080)] {
        let raw = RawImage::new(create_test_jpeg(width, height), "image/jpeg");
        let label = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::new("tensor", &label), &raw, |b, raw| {
            b.iter(|| normalize(black_box(raw), InputKind::Tensor { size: 500 }).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("data_uri", &label), &raw, |b, raw| {
            b.iter(|| normalize(black_box(raw), InputKind::EncodedDataUri).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_resize_and_scale, benchmark_full_normalize);
criterion_main!(benches);
