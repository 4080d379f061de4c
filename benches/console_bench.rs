use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hbf_console::completion::CompletionTree;
use hbf_console::config::ConfigStore;
use hbf_console::dispatcher::COMMANDS;
use hbf_console::logger::Logger;
use hbf_console::modules::registry::{BuiltinPlugins, DEFAULT_NAMESPACE};
use hbf_console::modules::ModuleRegistry;
use hbf_console::session::GlobalOptions;
use hbf_console::Console;

/// Benchmark full completion rebuilds as the global option set grows
fn bench_completion_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("completion_rebuild");
    let registry = ModuleRegistry::discover(DEFAULT_NAMESPACE, &BuiltinPlugins, &mut Logger::capture());
    let config = ConfigStore::with_defaults();

    for size in &[0usize, 16, 256] {
        let globals: GlobalOptions = (0..*size).map(|i| (format!("opt{i}"), i.to_string())).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &globals, |b, globals| {
            b.iter(|| CompletionTree::build(COMMANDS, &registry, &config, None, black_box(globals)));
        });
    }

    group.finish();
}

/// Benchmark dispatching a mutating command, rebuild included
fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    group.bench_function("setg", |b| {
        let registry = ModuleRegistry::discover(DEFAULT_NAMESPACE, &BuiltinPlugins, &mut Logger::capture());
        let mut console = Console::new(registry, ConfigStore::with_defaults(), Logger::capture());

        b.iter(|| {
            console.handle(black_box("setg timeout 5"));
            console.logger_mut().clear();
        });
    });

    group.bench_function("candidates", |b| {
        let registry = ModuleRegistry::discover(DEFAULT_NAMESPACE, &BuiltinPlugins, &mut Logger::capture());
        let console = Console::new(registry, ConfigStore::with_defaults(), Logger::capture());

        b.iter(|| console.completion().candidates(black_box("setc HYDRABUS ")));
    });

    group.finish();
}

criterion_group!(benches, bench_completion_rebuild, bench_dispatch);
criterion_main!(benches);
