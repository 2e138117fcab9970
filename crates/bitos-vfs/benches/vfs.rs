//! Benchmarks for VirtualFileSystem operations.

use bitos_vfs::{CurrentDir, RemoveOptions, VirtualFileSystem};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("vfs_create");

    for n_files in [100, 1_000] {
        let names: Vec<String> = (0..n_files).map(|i| format!("file_{i}.txt")).collect();
        let label = format!("{n_files}");

        group.bench_function(BenchmarkId::new("touch", &label), |b| {
            b.iter(|| {
                let mut vfs = VirtualFileSystem::new();
                let cwd = CurrentDir::root();
                for name in &names {
                    vfs.create_or_overwrite_file(&cwd, name, "data").unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("vfs_lookup");
    let vfs = VirtualFileSystem::seeded();
    let cwd = CurrentDir::home();

    for target in [
        "documents/readme.txt",
        "/proc/sys/kernel/osrelease",
        "../../sys/class/net/eth0/mtu",
    ] {
        group.bench_with_input(BenchmarkId::new("file_content", target), &target, |b, t| {
            b.iter(|| vfs.file_content(&cwd, t));
        });
    }

    group.finish();
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("vfs_list");

    for n_entries in [100, 1_000] {
        let mut vfs = VirtualFileSystem::new();
        let cwd = CurrentDir::root();
        for i in 0..n_entries {
            vfs.create_or_overwrite_file(&cwd, &format!("file_{i}.txt"), "data")
                .unwrap();
        }
        let label = format!("{n_entries}");

        group.bench_function(BenchmarkId::new("list_entries", &label), |b| {
            b.iter(|| vfs.list_entries(&cwd, None));
        });
    }

    group.finish();
}

fn bench_deep_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("vfs_deep");

    for depth in [10, 50] {
        let label = format!("depth_{depth}");

        group.bench_function(BenchmarkId::new("mkdir_cd_rm", &label), |b| {
            b.iter(|| {
                let mut vfs = VirtualFileSystem::new();
                let mut cwd = CurrentDir::root();
                for i in 0..depth {
                    let name = format!("d{i}");
                    vfs.make_directory(&cwd, &name).unwrap();
                    vfs.change_directory(&mut cwd, &name).unwrap();
                }
                let root = CurrentDir::root();
                let recursive = RemoveOptions {
                    recursive: true,
                    force: false,
                };
                vfs.remove(&root, "d0", recursive).unwrap();
            });
        });

        let mut vfs = VirtualFileSystem::new();
        let mut cwd = CurrentDir::root();
        for i in 0..depth {
            let name = format!("d{i}");
            vfs.make_directory(&cwd, &name).unwrap();
            vfs.change_directory(&mut cwd, &name).unwrap();
        }
        let root = CurrentDir::root();
        group.bench_function(BenchmarkId::new("walk", &label), |b| {
            b.iter(|| vfs.walk(&root, "/"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create, bench_lookup, bench_list, bench_deep_tree);
criterion_main!(benches);
