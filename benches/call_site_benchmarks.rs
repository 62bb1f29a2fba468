//! Performance benchmarks for stencil call sites.
//!
//! - Bootstrap: parsing and binding a call site
//! - Monomorphic: one policy type per site, eager vs specialized
//! - Polymorphic: guard chains of increasing length, and the megamorphic fallback
//! - JSON: re-parsing per call vs a specialized skeleton
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use stencil::{
    CacheConfig, Dynamic, FromDynamic, JsonLiteral, JsonValue, PolicyError, SiteSignature,
    StringConcat, StringConcatOptimized, TemplatePolicy, TemplatedString, ValueType, args,
    bootstrap, bootstrap_sealed, bootstrap_with_config,
};

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

struct Tag<const N: i64>;

impl<const N: i64> TemplatePolicy for Tag<N> {
    fn apply(&self, _: &TemplatedString, args: &[Dynamic]) -> Result<Dynamic, PolicyError> {
        Ok(Dynamic::Int(N + i64::from_dynamic(&args[0])?))
    }
}

const NAME_AGE: &str = "name: \u{FFFC} age: \u{FFFC}";

fn concat_site() -> SiteSignature {
    SiteSignature::new(ValueType::String, [ValueType::String, ValueType::Int])
}

fn bootstrap_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("call_site/bootstrap");

    group.bench_function("concat", |b| {
        b.iter(|| {
            let site = bootstrap(concat_site(), None, black_box(NAME_AGE)).unwrap();
            end_profiling_frame();
            black_box(site)
        });
    });

    group.bench_function("first_call", |b| {
        b.iter(|| {
            let site = bootstrap(concat_site(), None, black_box(NAME_AGE)).unwrap();
            let text = site.invoke(&StringConcatOptimized, &args!["Bob", 24]).unwrap();
            end_profiling_frame();
            black_box(text)
        });
    });

    group.finish();
}

fn monomorphic_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("call_site/monomorphic");
    let args = args!["Bob", 24];

    let eager = bootstrap(concat_site(), None, NAME_AGE).unwrap();
    group.bench_function("concat_eager", |b| {
        b.iter(|| black_box(eager.invoke(&StringConcat, black_box(&args)).unwrap()));
    });

    let optimized = bootstrap(concat_site(), None, NAME_AGE).unwrap();
    group.bench_function("concat_specialized", |b| {
        b.iter(|| black_box(optimized.invoke(&StringConcatOptimized, black_box(&args)).unwrap()));
    });

    let sealed = bootstrap_sealed::<StringConcatOptimized>(concat_site(), None, NAME_AGE).unwrap();
    group.bench_function("concat_sealed", |b| {
        b.iter(|| black_box(sealed.invoke(&StringConcatOptimized, black_box(&args)).unwrap()));
    });

    group.finish();
    end_profiling_frame();
}

fn polymorphic_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("call_site/polymorphic");
    let policies: [&dyn TemplatePolicy; 8] = [
        &Tag::<1>, &Tag::<2>, &Tag::<3>, &Tag::<4>,
        &Tag::<5>, &Tag::<6>, &Tag::<7>, &Tag::<8>,
    ];
    let sig = SiteSignature::new(ValueType::Int, [ValueType::Int]);
    let args = args![10];

    for width in [1usize, 2, 4, 8] {
        let site = bootstrap(sig.clone(), None, "\u{FFFC}").unwrap();
        group.bench_with_input(BenchmarkId::new("chain", width), &width, |b, &width| {
            b.iter(|| {
                for policy in &policies[..width] {
                    black_box(site.invoke(*policy, black_box(&args)).unwrap());
                }
            });
        });
    }

    let config = CacheConfig::new().with_max_chain_length(2);
    let megamorphic = bootstrap_with_config(sig, None, "\u{FFFC}", config).unwrap();
    group.bench_function("megamorphic_8", |b| {
        b.iter(|| {
            for policy in &policies {
                black_box(megamorphic.invoke(*policy, black_box(&args)).unwrap());
            }
        });
    });

    group.finish();
    end_profiling_frame();
}

fn json_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("call_site/json");
    let template = "{\n  \"name\": \u{FFFC},\n  \"age\": \u{FFFC},\n  \"sex\": true\n}\n";
    let json = ValueType::native::<JsonValue>();
    let params = [ValueType::String, ValueType::Int];
    let args = args!["Bob", 77];

    let templated = TemplatedString::parse(template, json.clone(), None, &params).unwrap();
    group.bench_function("eager_apply", |b| {
        b.iter(|| black_box(JsonLiteral.apply(&templated, black_box(&args)).unwrap()));
    });

    let site = bootstrap(SiteSignature::new(json.clone(), params), None, template).unwrap();
    group.bench_function("specialized", |b| {
        b.iter(|| black_box(site.invoke(&JsonLiteral, black_box(&args)).unwrap()));
    });

    let constant = bootstrap(
        SiteSignature::new(json, []),
        None,
        "{ \"x\": 35.2, \"y\": 42.9 }",
    )
    .unwrap();
    group.bench_function("constant", |b| {
        b.iter(|| black_box(constant.invoke(&JsonLiteral, &[]).unwrap()));
    });

    group.finish();
    end_profiling_frame();
}

criterion_group!(
    benches,
    bootstrap_benchmarks,
    monomorphic_benchmarks,
    polymorphic_benchmarks,
    json_benchmarks
);
criterion_main!(benches);
