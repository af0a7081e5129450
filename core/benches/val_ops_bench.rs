use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use opbench_core::val::Val;
use std::hint::black_box;

fn nested() -> Val {
    let mut obj = Val::empty_map();
    obj.set_field("foo", Val::List(vec![Val::empty_map(), Val::empty_list()]))
        .unwrap();
    obj
}

fn bench_field_set(c: &mut Criterion) {
    let mut obj = nested();
    let mut j = 0i64;
    c.bench_function("val_nested_field_set", |b| {
        b.iter(|| {
            let foo = obj.field_mut("foo").unwrap();
            foo.index_mut(0).unwrap().set_field("bar", Val::Int(j)).unwrap();
            j += 1;
            black_box(&obj);
        })
    });
}

fn bench_string_concat(c: &mut Criterion) {
    let head = Val::from("Hello,");
    let tail = Val::from("World!");
    c.bench_function("val_str_concat", |b| {
        b.iter(|| black_box(black_box(&head).add(black_box(&tail)).unwrap()))
    });
}

fn bench_list_append(c: &mut Criterion) {
    c.bench_function("val_list_append_1k", |b| {
        b.iter_batched(
            Val::empty_list,
            |mut arr| {
                for j in 0..1_000usize {
                    arr.set_index(j, Val::Int((j * j) as i64)).unwrap();
                }
                black_box(arr)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(val_ops, bench_field_set, bench_string_concat, bench_list_append);
criterion_main!(val_ops);
