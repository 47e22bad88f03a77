//! Benchmarks for layout passes and linked highlighting.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_precision_loss)]

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dvtable::config::FieldMeta;
use dvtable::data::TableData;
use dvtable::layout::find_max_at_indices;
use dvtable::{
    CellValue, HeadlessSurface, LayoutKind, Record, Surface, Table, TableConfig, TableContext,
};

const COLUMNS: usize = 12;

fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            (0..COLUMNS)
                .map(|c| {
                    let value = if c == 0 {
                        CellValue::Text(format!("region {i}"))
                    } else {
                        CellValue::Number((i * c) as f64 * 1.5)
                    };
                    (format!("c{c}"), value)
                })
                .collect()
        })
        .collect()
}

fn config(kind: LayoutKind, n: usize) -> TableConfig {
    let mut config = TableConfig {
        table_type: kind,
        ..TableConfig::default()
    };
    config.option.data = TableData::Flat(records(n));
    config.option.columns = (0..COLUMNS).map(|c| format!("c{c}")).collect();
    config.pagination.page_size = n;
    for c in 1..COLUMNS {
        config
            .option
            .data_meta_info
            .insert(format!("c{c}"), FieldMeta::number(None));
    }
    config
}

fn mount(surface: &Rc<HeadlessSurface>, config: TableConfig) -> Table {
    let shared: Rc<dyn Surface> = Rc::clone(surface) as Rc<dyn Surface>;
    Table::new(shared, surface.root(), config, &TableContext::new()).expect("table builds")
}

/// Full first pass: measuring, width resolution and mounting.
fn bench_first_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_pass");
    for rows in [10, 100, 1000] {
        group.throughput(Throughput::Elements((rows * COLUMNS) as u64));
        for kind in [LayoutKind::Vertical, LayoutKind::MultiX] {
            group.bench_with_input(
                BenchmarkId::new(format!("{kind:?}"), rows),
                &rows,
                |b, rows| {
                    b.iter(|| {
                        let surface = Rc::new(HeadlessSurface::new());
                        let table = mount(&surface, config(kind, *rows));
                        table.destroy();
                    });
                },
            );
        }
    }
    group.finish();
}

/// Hovering a body cell resolves its L-shape over the whole grid.
fn bench_hover(c: &mut Criterion) {
    let surface = Rc::new(HeadlessSurface::new());
    let table = mount(&surface, config(LayoutKind::Vertical, 1000));
    let cell = table.cell_element(500, 6).expect("cell exists");

    c.bench_function("hover_l_shape_1000x12", |b| {
        b.iter(|| {
            surface.hover(black_box(cell));
            surface.leave(black_box(cell));
        });
    });
}

fn bench_find_max(c: &mut Criterion) {
    let measurements: Vec<Vec<f64>> = (0..200)
        .map(|k| (0..500).map(|i| ((k * 31 + i * 17) % 300) as f64).collect())
        .collect();
    c.bench_function("find_max_at_indices_200x500", |b| {
        b.iter(|| find_max_at_indices(black_box(&measurements)).expect("same lengths"))
    });
}

criterion_group!(benches, bench_first_pass, bench_hover, bench_find_max);

criterion_main!(benches);
