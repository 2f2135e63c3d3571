use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use heatsink_rs::discretization::grid::{Grid, SweepKernel};
use heatsink_rs::models::heatsink::materials;
use heatsink_rs::models::heatsink::package::HeatSinkLayout;
use heatsink_rs::numerics::RelaxationSettings;
use heatsink_rs::physics::convection::{Convection, ConvectionMode};

/// Side lengths [mm] of the square benchmark grids at 0.2 mm.
fn grid_sides() -> Vec<u32> {
    vec![10, 40]
}

fn square_grid(side: u32) -> Grid {
    let side = side as f64;
    let mut grid = Grid::new(
        (0.0, side),
        (0.0, side),
        0.2,
        materials::microprocessor(),
        true,
    )
    .unwrap();
    grid.fill_interior(343.0);
    grid
}

fn bench_grid_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_sweep");
    for &side in &grid_sides() {
        let grid = square_grid(side);
        for kernel in [SweepKernel::Pointwise, SweepKernel::Shifted] {
            let id = BenchmarkId::new(format!("{kernel:?}"), side);
            group.bench_with_input(id, &side, |b, &_| {
                b.iter(|| std::hint::black_box(grid.sweep(kernel)));
            });
        }
    }
    group.finish();
}

fn bench_grid_relax(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_relax");
    let settings = RelaxationSettings {
        tolerance: 1e-10,
        ..RelaxationSettings::grid()
    };
    for &side in &[5u32, 10] {
        let mut grid = square_grid(side);
        grid.update_boundary(&Convection::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &_| {
            b.iter_batched(
                || grid.clone(),
                |mut g| {
                    let _ = g.relax_with(SweepKernel::Shifted, &settings);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");
    let layouts = [
        ("bare", HeatSinkLayout::bare_package()),
        ("finned", HeatSinkLayout::default()),
    ];
    for (name, layout) in layouts {
        let composite = layout.build().unwrap();
        group.bench_function(BenchmarkId::new("sweep", name), |b| {
            b.iter(|| std::hint::black_box(composite.sweep()));
        });
        let convection = Convection::new(ConvectionMode::Natural);
        group.bench_function(BenchmarkId::new("boundary_update", name), |b| {
            b.iter_batched(
                || composite.clone(),
                |mut c| c.update_boundary(&convection),
                BatchSize::LargeInput,
            );
        });
        group.bench_function(BenchmarkId::new("assemble", name), |b| {
            b.iter(|| std::hint::black_box(layout.build()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_grid_sweep, bench_grid_relax, bench_composite);
criterion_main!(benches);
