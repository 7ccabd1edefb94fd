//! Benchmarks for the parse -> classify -> transform -> emit pipeline.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use react_agentic::bundler::{BundleEntry, Bundler};
use react_agentic::config::Config;
use react_agentic::driver::compile_workspace;
use react_agentic::error::CompileError;

struct NoopBundler;
impl Bundler for NoopBundler {
    fn bundle(&self, _entries: &[BundleEntry]) -> Result<String, CompileError> {
        Ok(String::new())
    }
}

fn simple_command() -> String {
    r#"export default (
  <Command name="hello" description="say hi">
    <p>Hi.</p>
  </Command>
)"#
    .to_string()
}

fn command_with_blocks(count: usize) -> String {
    let mut body = String::new();
    for i in 0..count {
        body.push_str(&format!("<p>Step {i} of the workflow.</p>\n"));
    }
    format!(
        r#"export default (
  <Command name="workflow" description="multi-step workflow">
    {body}
  </Command>
)"#
    )
}

fn runtime_command() -> String {
    r#"
import { useRuntimeVar } from "react-agentic";
const ctx = useRuntimeVar<{phase:{id:string}}>("CTX");
export default (
  <Command name="runtime" description="runtime-aware command">
    <p>Phase {ctx.phase.id}</p>
  </Command>
)"#
    .to_string()
}

fn compile_fixture(dir: &std::path::Path, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}

fn pipeline_benchmarks(c: &mut Criterion) {
    let config = Config::default();

    c.bench_function("simple_command", |b| {
        b.iter_batched(
            || {
                let dir = tempfile::tempdir().unwrap();
                let path = compile_fixture(dir.path(), "hello.tsx", &simple_command());
                (dir, path)
            },
            |(dir, path)| {
                black_box(compile_workspace(&[path], dir.path(), &config, &NoopBundler).unwrap())
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("runtime_command", |b| {
        b.iter_batched(
            || {
                let dir = tempfile::tempdir().unwrap();
                let path = compile_fixture(dir.path(), "runtime.tsx", &runtime_command());
                (dir, path)
            },
            |(dir, path)| {
                black_box(compile_workspace(&[path], dir.path(), &config, &NoopBundler).unwrap())
            },
            criterion::BatchSize::SmallInput,
        )
    });

    let mut group = c.benchmark_group("block_count");
    for count in [10, 50, 200].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || {
                    let dir = tempfile::tempdir().unwrap();
                    let path = compile_fixture(dir.path(), "workflow.tsx", &command_with_blocks(count));
                    (dir, path)
                },
                |(dir, path)| {
                    black_box(compile_workspace(&[path], dir.path(), &config, &NoopBundler).unwrap())
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();

    let mut group = c.benchmark_group("batch_size");
    for count in [1, 5, 20].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || {
                    let dir = tempfile::tempdir().unwrap();
                    let paths = (0..count)
                        .map(|i| compile_fixture(dir.path(), &format!("cmd{i}.tsx"), &simple_command()))
                        .collect::<Vec<_>>();
                    (dir, paths)
                },
                |(dir, paths)| {
                    black_box(compile_workspace(&paths, dir.path(), &config, &NoopBundler).unwrap())
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, pipeline_benchmarks);
criterion_main!(benches);
