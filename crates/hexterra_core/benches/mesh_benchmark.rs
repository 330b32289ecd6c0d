//! Benchmark for hex prism meshing.
//!
//! Run with: cargo bench --package hexterra_core --bench mesh_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hexterra_core::{
    triangulate, triangulate_into, ChunkDims, ChunkMesh, ChunkNeighbors, ChunkVolume, HexMetrics,
    Material,
};

fn rolling_terrain(dims: ChunkDims) -> ChunkVolume {
    let mut volume = ChunkVolume::new(dims);
    for z in 0..dims.length() {
        for x in 0..dims.width() {
            let h = 20 + (x * 3 + z * 5) % 12;
            volume
                .fill_column(x, z, h, Material::Dirt, Material::Grass)
                .unwrap();
        }
    }
    volume
}

fn benchmark_triangulate(c: &mut Criterion) {
    let dims = ChunkDims::default();
    let metrics = HexMetrics::default();
    let volume = rolling_terrain(dims);
    let neighbor = rolling_terrain(dims);
    let neighbors = ChunkNeighbors::from_fn(|_| Some(&neighbor));

    let mut group = c.benchmark_group("triangulate");
    group.throughput(Throughput::Elements(dims.volume() as u64));

    group.bench_function("rolling_chunk_fresh_buffers", |b| {
        b.iter(|| black_box(triangulate(black_box(&volume), &neighbors, &metrics)));
    });

    group.bench_function("rolling_chunk_reused_buffers", |b| {
        let mut mesh = ChunkMesh::default();
        b.iter(|| {
            triangulate_into(black_box(&volume), &neighbors, &metrics, &mut mesh);
            black_box(mesh.triangle_count())
        });
    });

    group.finish();
}

fn benchmark_worst_case(c: &mut Criterion) {
    // Checkerboard of single cells: every face exposed
    let dims = ChunkDims::default();
    let metrics = HexMetrics::default();
    let mut volume = ChunkVolume::new(dims);
    for y in 0..dims.height() {
        for z in 0..dims.length() {
            for x in 0..dims.width() {
                if (x + y + z) % 2 == 0 {
                    volume.set(x, y, z, Material::Sand.into()).unwrap();
                }
            }
        }
    }

    c.bench_function("triangulate_checkerboard", |b| {
        b.iter(|| black_box(triangulate(black_box(&volume), &ChunkNeighbors::none(), &metrics)));
    });
}

criterion_group!(benches, benchmark_triangulate, benchmark_worst_case);
criterion_main!(benches);
