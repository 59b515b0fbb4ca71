use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lattice_oxide::geometry::{BBox, Orientation, PixelRect};
use lattice_oxide::lattice::lines::detect_lines;
use lattice_oxide::layout::TextLine;
use lattice_oxide::raster::BinaryRaster;
use lattice_oxide::{LatticeConfig, LatticeExtractor, PageLayout};

// Ruled grid of `n x n` cells, 40px each, with one text fragment per cell
fn ruled_page(n: u32) -> (BinaryRaster, PageLayout) {
    let side = 40 * n + 100;
    let mut raster = BinaryRaster::new(side, side);
    let extent = (40 * n + 2) as i32;
    for i in 0..=n as i32 {
        let at = 50 + i * 40;
        raster.fill_rect(PixelRect::new(at, 50, 2, extent));
        raster.fill_rect(PixelRect::new(50, at, extent, 2));
    }

    let height = side as f32;
    let mut lines = Vec::new();
    for r in 0..n {
        for c in 0..n {
            let x = 60.0 + c as f32 * 40.0;
            let y = height - (75.0 + r as f32 * 40.0);
            if let Some(line) = TextLine::horizontal_run("cell", x, y, y + 8.0, 5.0) {
                lines.push(line);
            }
        }
    }
    (raster, PageLayout::new(side as f32, height).with_lines(lines))
}

fn bench_detect_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_lines");
    for n in [5u32, 20] {
        let (raster, _) = ruled_page(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &raster, |b, raster| {
            b.iter(|| detect_lines(black_box(raster), Orientation::Vertical, 15, 0))
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let extractor = LatticeExtractor::new(LatticeConfig::default().with_split_text(true))
        .expect("default config is valid");
    let mut group = c.benchmark_group("extract");
    for n in [5u32, 20] {
        let (raster, page) = ruled_page(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(raster, page), |b, (raster, page)| {
            b.iter(|| extractor.extract(black_box(raster), black_box(page)))
        });
    }
    group.finish();
}

fn bench_region_filter(c: &mut Criterion) {
    let (_, page) = ruled_page(20);
    let region = BBox::new(0.0, 0.0, 400.0, 400.0);
    c.bench_function("filter_text_in_region", |b| {
        b.iter(|| lattice_oxide::lattice::assign::filter_in_bbox(&region, black_box(&page.lines), 2.0))
    });
}

criterion_group!(benches, bench_detect_lines, bench_extract, bench_region_filter);
criterion_main!(benches);
