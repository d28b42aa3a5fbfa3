use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use slim_dict::SlimDict;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("slim_dict_insert_10k", |b| {
        b.iter_batched(
            SlimDict::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.set(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("slim_dict_get_hit", |b| {
        let mut m = SlimDict::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.set(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k));
        })
    });
}

fn bench_get_hit_alternate(c: &mut Criterion) {
    c.bench_function("slim_dict_get_hit_str", |b| {
        let mut m = SlimDict::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.set(k, i as u64);
        }
        let alt = m.alternate_lookup::<str>().unwrap();
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(alt.get(k.as_str()));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("slim_dict_get_miss", |b| {
        let mut m = SlimDict::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.set(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(m.get(&k));
        })
    });
}

fn bench_remove_reinsert(c: &mut Criterion) {
    c.bench_function("slim_dict_remove_reinsert", |b| {
        let mut m = SlimDict::new();
        let keys: Vec<_> = lcg(3).take(10_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.set(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            // freed slot is reused by the reinsert, capacity stays fixed
            let k = it.next().unwrap();
            let (k, v) = m.remove_entry(k).unwrap();
            m.set(k, black_box(v));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_hit_alternate, bench_get_miss, bench_remove_reinsert
}
criterion_main!(benches);
