use archmage::SimdToken;
use convbench::{
    BenchmarkParameters, Geometry, PixelSource, ReclamationPolicy, Runner, ScratchPool, Strategy,
    SyntheticSource,
};
use criterion::{BenchmarkGroup, Criterion, Throughput, measurement::WallTime};

// === SIMD tier detection ===

fn probe<T: SimdToken>() -> &'static str {
    if T::summon().is_some() {
        "available"
    } else {
        "not available"
    }
}

fn print_simd_info() {
    eprintln!("=== SIMD Tier Detection ===");
    #[cfg(target_arch = "x86_64")]
    {
        eprintln!(
            "  AVX2+FMA (x86-64-v3):    {}",
            probe::<archmage::X64V3Token>()
        );
    }
    eprintln!("  Scalar lanes:            always available");
    eprintln!("===========================");
}

// === Scalar disable/enable via archmage ===

fn disable_all_simd() {
    let _ = archmage::dangerously_disable_tokens_except_wasm(true);
}

fn enable_all_simd() {
    let _ = archmage::dangerously_disable_tokens_except_wasm(false);
}

// === Benchmark helpers ===

const W: usize = 1920;
const H: usize = 1080;

fn frame(row_align: usize) -> (Vec<u8>, Geometry) {
    let image = SyntheticSource::new(W, H)
        .with_row_align(row_align)
        .load()
        .unwrap();
    (image.data().to_vec(), image.geometry())
}

fn bench_strategy(
    group: &mut BenchmarkGroup<WallTime>,
    name: &str,
    strategy: Strategy,
    src: &[u8],
    geometry: Geometry,
) {
    let pool = ScratchPool::new();
    group.bench_function(name, |b| {
        let mut dst = vec![0u8; src.len()];
        b.iter(|| strategy.apply_with_pool(&pool, src, &mut dst, geometry).unwrap());
    });
}

// === Benchmark groups ===

fn bench_packed(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_1920x1080");
    let (src, geometry) = frame(1);
    group.throughput(Throughput::Bytes(src.len() as u64));

    for strategy in Strategy::ALL {
        bench_strategy(&mut group, strategy.id(), strategy, &src, geometry);
    }
    disable_all_simd();
    bench_strategy(&mut group, "simd-lane_scalar", Strategy::SimdLane, &src, geometry);
    enable_all_simd();

    group.finish();
}

fn bench_padded(c: &mut Criterion) {
    let mut group = c.benchmark_group("padded_rows_1920x1080");
    let (src, geometry) = frame(64);
    group.throughput(Throughput::Bytes(src.len() as u64));
    bench_strategy(&mut group, "stride-aware", Strategy::StrideAware, &src, geometry);
    group.finish();
}

/// Whole-harness cost per policy: allocation, repacking and pool upkeep
/// included.
fn bench_reclamation(c: &mut Criterion) {
    let mut group = c.benchmark_group("runner_reclamation");
    group.sample_size(10);
    let source = SyntheticSource::new(W, H).with_row_align(4);
    for policy in ReclamationPolicy::ALL {
        let pool = ScratchPool::new();
        let runner = Runner::with_pool(&pool);
        let params = BenchmarkParameters::builder()
            .iterations(1)
            .reclamation(policy)
            .build();
        group.bench_function(policy.name(), |b| {
            b.iter(|| runner.run(Strategy::SimdLane, &source, &params).unwrap());
        });
    }
    group.finish();
}

fn main() {
    print_simd_info();

    let mut criterion = Criterion::default().configure_from_args();
    bench_packed(&mut criterion);
    bench_padded(&mut criterion);
    bench_reclamation(&mut criterion);
    criterion.final_summary();
}
