use criterion::{black_box, criterion_group, criterion_main, Criterion};
use blast_board::core::{
    all_regions, compact, find_connected_region, recompute_primed, refill, Board, BoardConfig,
    Grid, MemoryLevelSource, NullSink, SimpleRng,
};
use blast_board::types::ItemKind;

fn random_grid(seed: u32, size: u8) -> Grid {
    let mut rng = SimpleRng::new(seed);
    let mut grid = Grid::new(size, size);
    for y in 0..size as i8 {
        for x in 0..size as i8 {
            grid.spawn(x, y, rng.cube());
        }
    }
    grid
}

/// Single color everywhere: the worst case for region search.
fn solid_grid(size: u8) -> Grid {
    let mut grid = Grid::new(size, size);
    for y in 0..size as i8 {
        for x in 0..size as i8 {
            grid.spawn(x, y, ItemKind::Red);
        }
    }
    grid
}

fn bench_region_search(c: &mut Criterion) {
    let grid = solid_grid(16);
    c.bench_function("region_16x16_solid", |b| {
        b.iter(|| find_connected_region(black_box(&grid), 0, 0))
    });

    let grid = random_grid(12345, 16);
    c.bench_function("all_regions_16x16_random", |b| b.iter(|| all_regions(black_box(&grid))));
}

fn bench_gravity(c: &mut Criterion) {
    let base = random_grid(12345, 12);
    c.bench_function("compact_refill_half_cleared_12x12", |b| {
        b.iter(|| {
            let mut grid = base.clone();
            for y in 0..12 {
                for x in (0..12).step_by(2) {
                    grid.remove(x, y);
                }
            }
            let mut rng = SimpleRng::new(7);
            compact(&mut grid);
            refill(&mut grid, &mut rng);
            recompute_primed(&mut grid);
            grid
        })
    });
}

fn bench_blast_cycle(c: &mut Criterion) {
    let base = solid_grid(9);
    c.bench_function("blast_cycle_9x9", |b| {
        b.iter(|| {
            let mut board = Board::new(
                BoardConfig::default(),
                MemoryLevelSource::new(),
                NullSink,
                NullSink,
            );
            board.load_grid(base.clone(), 10);
            board.try_blast(black_box(4), black_box(4));
            board.tick(16);
            board.moves_left()
        })
    });
}

criterion_group!(benches, bench_region_search, bench_gravity, bench_blast_cycle);
criterion_main!(benches);
