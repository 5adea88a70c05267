// Copyright 2025 the Isagoge Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use isagoge_index::{BandQuery, BoundingBox, Direction, IndexConfig, Page, PageId, SpatialIndex};
use isagoge_relations::{
    AnalysisConfig, CancelFlag, CoverageAnalyzer, PageAnalyzer, Scope, analyze_pages,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, n: i32) -> i32 {
        (self.next_u64() % n as u64) as i32
    }
}

/// Rows of glyph-sized boxes, with a raised or lowered small box after some glyphs.
fn gen_text_page(id: u32, rows: i32, glyphs_per_row: i32, seed: u64) -> Page {
    let mut rng = Rng::new(seed);
    let width = glyphs_per_row * 16 + 64;
    let height = rows * 40 + 64;
    let mut page = Page::with_size(PageId(id), width, height).unwrap();
    for row in 0..rows {
        let base = 32 + row * 40;
        let mut x = 16;
        for _ in 0..glyphs_per_row {
            let w = 8 + rng.below(4);
            let h = 14 + rng.below(6);
            page.push_box(BoundingBox::new(x, base, x + w, base + h).unwrap());
            match rng.below(16) {
                0 => {
                    let sx = x + w + 1;
                    page.push_box(BoundingBox::new(sx, base + h - 4, sx + 5, base + h + 4).unwrap());
                }
                1 => {
                    let sx = x + w + 1;
                    page.push_box(BoundingBox::new(sx, base - 4, sx + 5, base + 4).unwrap());
                }
                _ => {}
            }
            x += 16;
        }
    }
    page
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("index");
    for &rows in &[10i32, 40] {
        let page = gen_text_page(0, rows, 60, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(page.len() as u64));
        group.bench_function(format!("build_rows{rows}"), |b| {
            b.iter(|| {
                let index = SpatialIndex::build(&page, &IndexConfig::default()).unwrap();
                black_box(index.len());
            })
        });
        let index = SpatialIndex::build(&page, &IndexConfig::default()).unwrap();
        group.bench_function(format!("band_right_rows{rows}"), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for e in page.elements().iter().step_by(7) {
                    let q = BandQuery::unit_from(e.bbox(), Direction::Right, e.bbox().height() / 2);
                    hits += index.directional_search(&q).take(4).count();
                }
                black_box(hits);
            })
        });
    }
    group.finish();
}

fn bench_analyzers(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzers");
    let config = AnalysisConfig::default();
    let page = gen_text_page(0, 20, 60, 0xBADC_F00D_1234_5678);
    let index = SpatialIndex::build(&page, &config.index).unwrap();
    group.throughput(Throughput::Elements(page.len() as u64));

    group.bench_function("coverage", |b| {
        b.iter(|| {
            let scope = Scope::new(&page, &index).unwrap();
            let mut analyzer = CoverageAnalyzer::new(&scope, &config.coverage);
            black_box(analyzer.analyze_page().unwrap().len());
        })
    });
    group.bench_function("page", |b| {
        b.iter(|| {
            let rel = PageAnalyzer::new(&config).analyze_indexed(&page, &index).unwrap();
            black_box(rel.elements().len());
        })
    });
    group.finish();
}

fn bench_pages(c: &mut Criterion) {
    let mut group = c.benchmark_group("pages");
    let config = AnalysisConfig::default();
    let pages: Vec<Page> = (0..8)
        .map(|i| gen_text_page(i, 20, 60, 0xC1A5_7E55_9999_ABCD + u64::from(i)))
        .collect();
    let total: usize = pages.iter().map(Page::len).sum();
    group.throughput(Throughput::Elements(total as u64));
    group.bench_function("analyze_pages8", |b| {
        b.iter_batched(
            CancelFlag::new,
            |cancel| {
                let results = analyze_pages(&pages, &config, &cancel);
                black_box(results.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_index, bench_analyzers, bench_pages);
criterion_main!(benches);
