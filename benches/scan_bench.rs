use criterion::{black_box, criterion_group, criterion_main, Criterion};

use taglia::scan::{split_list, tokenize};

const PLAIN: &str = "customName,omitempty,precision=2,mode=strict";
const QUOTED: &str = "'a name with, commas',note='it\\'s quoted',flag";
const LISTED: &str = "ids=[1,2,3,4,5,6,7,8],names=['a','b','c'],omitempty";
const LIST_BODY: &str = "'quoted, element',bare element,'it\\'s',last";

fn plain_bench(c: &mut Criterion) {
    c.bench_function("tokenize_plain", |b| {
        b.iter(|| black_box(tokenize(black_box(PLAIN)).unwrap()))
    });
}

fn quoted_bench(c: &mut Criterion) {
    c.bench_function("tokenize_quoted", |b| {
        b.iter(|| black_box(tokenize(black_box(QUOTED)).unwrap()))
    });
}

fn listed_bench(c: &mut Criterion) {
    c.bench_function("tokenize_bracketed", |b| {
        b.iter(|| black_box(tokenize(black_box(LISTED)).unwrap()))
    });
}

fn split_bench(c: &mut Criterion) {
    c.bench_function("split_list_elements", |b| {
        b.iter(|| black_box(split_list(black_box(LIST_BODY)).unwrap()))
    });
}

criterion_group! {
    name = scan_benches;
    config = Criterion::default();
    targets = plain_bench, quoted_bench, listed_bench, split_bench
}

criterion_main!(scan_benches);
