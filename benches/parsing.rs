use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kdl_relaxed::{
    parse, parse_reader_with_options, parse_with_options, to_string, ParseOptions, Relaxed,
    Scanner,
};
use std::io::Cursor;

fn document(nodes: usize) -> String {
    let mut out = String::new();
    for i in 0..nodes {
        out.push_str(&format!(
            "// entry {i}\nserver{i} \"host-{i}.example.com\" port={port} weight=0.{i} {{\n\tmask 0x{i:04x}\n\tenabled true\n}}\n",
            port = 8000 + i
        ));
    }
    out
}

fn nginx(blocks: usize) -> String {
    let mut out = String::new();
    for i in 0..blocks {
        out.push_str(&format!(
            "location /app{i} {{\n\t# route {i}\n\troot /var/www/app{i};\n\ttry_files $uri $uri/ /index.php;\n}}\n"
        ));
    }
    out
}

fn benchmark_scan(c: &mut Criterion) {
    let input = document(100);
    c.bench_function("scan_document", |b| {
        b.iter(|| {
            Scanner::from_slice(black_box(input.as_bytes()), Relaxed::STRICT)
                .scan_all()
                .unwrap()
        })
    });
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_document");

    for size in [10, 100, 1000].iter() {
        let input = document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| parse(black_box(input)))
        });
    }

    group.finish();
}

fn benchmark_parse_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_reader");
    let input = document(1000);

    for buffer_size in [64, 4096, 64 * 1024].iter() {
        let options = ParseOptions::new().with_buffer_size(*buffer_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &options,
            |b, options| {
                b.iter(|| {
                    parse_reader_with_options(Cursor::new(black_box(input.as_bytes())), options)
                })
            },
        );
    }

    group.finish();
}

fn benchmark_parse_comments(c: &mut Criterion) {
    let input = document(100);
    let options = ParseOptions::new().with_parse_comments(true);
    c.bench_function("parse_with_comments", |b| {
        b.iter(|| parse_with_options(black_box(input.as_bytes()), &options))
    });
}

fn benchmark_nginx(c: &mut Criterion) {
    let input = nginx(100);
    let options = ParseOptions::new().with_relaxed(Relaxed::NGINX_SYNTAX);
    c.bench_function("parse_nginx", |b| {
        b.iter(|| parse_with_options(black_box(input.as_bytes()), &options))
    });
}

fn benchmark_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_document");

    for size in [10, 100, 1000].iter() {
        let doc = parse(&document(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &doc, |b, doc| {
            b.iter(|| to_string(black_box(doc)))
        });
    }

    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let input = document(100);
    c.bench_function("roundtrip", |b| {
        b.iter(|| {
            let doc = parse(black_box(&input)).unwrap();
            to_string(black_box(&doc)).unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_scan,
    benchmark_parse,
    benchmark_parse_reader,
    benchmark_parse_comments,
    benchmark_nginx,
    benchmark_serialize,
    benchmark_roundtrip
);
criterion_main!(benches);
