//! Performance benchmarks for arbor

use arbor::test_utils::TestTree;
use arbor::{DepthLimit, FsProvider, MemoryFs, Options, OsFs, Printer, Report, SortKind, Tree};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// `dirs` directories of `files` files each, two levels deep.
fn memory_tree(dirs: usize, files: usize) -> MemoryFs {
    let mut fs = MemoryFs::new();
    for d in 0..dirs {
        for f in 0..files {
            fs = fs.file(format!("/bench/d{d:03}/sub/f{f:04}.txt"), (d * f) as u64);
        }
    }
    fs
}

fn render(fs: &dyn FsProvider, root: &str, options: &Options) -> Vec<u8> {
    let mut tree = Tree::build(root, fs, options);
    let mut report = Report::default();
    report.add(&mut tree);
    let mut printer = Printer::new(Vec::new(), fs, options);
    printer.print(&mut tree).unwrap();
    printer.write_report(&report).unwrap();
    printer.into_inner()
}

fn bench_build(c: &mut Criterion) {
    let fs = memory_tree(50, 100);
    let sequential = Options {
        workers: 1,
        ..Default::default()
    };
    let parallel = Options {
        workers: 0,
        ..Default::default()
    };

    c.bench_function("build_sequential_5000", |b| {
        b.iter(|| Tree::build(black_box("/bench"), &fs, &sequential))
    });
    c.bench_function("build_parallel_5000", |b| {
        b.iter(|| Tree::build(black_box("/bench"), &fs, &parallel))
    });
}

fn bench_render(c: &mut Criterion) {
    let fs = memory_tree(50, 100);
    let auto = Options::default();
    let full = Options {
        depth: DepthLimit::Unlimited,
        show_bytes: true,
        ..Default::default()
    };
    let by_size = Options {
        sort: SortKind::Size,
        ..full.clone()
    };

    c.bench_function("render_auto_depth", |b| {
        b.iter(|| render(&fs, black_box("/bench"), &auto))
    });
    c.bench_function("render_unlimited_bytes", |b| {
        b.iter(|| render(&fs, black_box("/bench"), &full))
    });
    c.bench_function("render_size_sort", |b| {
        b.iter(|| render(&fs, black_box("/bench"), &by_size))
    });
}

fn bench_real_directory(c: &mut Criterion) {
    let tree = TestTree::new();
    for d in 0..20 {
        for f in 0..25 {
            tree.add_sized(&format!("d{d}/f{f}.txt"), f);
        }
    }
    let root = tree.path().to_string_lossy().to_string();
    let options = Options::default();

    c.bench_function("render_os_500", |b| {
        b.iter(|| render(&OsFs, black_box(&root), &options))
    });
}

criterion_group!(benches, bench_build, bench_render, bench_real_directory);
criterion_main!(benches);
