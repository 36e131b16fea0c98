//! Benchmarks for snvmap bulk population and lookups

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use snvmap::config::StoreConfig;
use snvmap::hashset::{MergeMode, SetStore};
use snvmap::variant::{encode_record, make_key, Strand};
use tempfile::TempDir;

const KEYS: u64 = 500;
const RECORDS_PER_KEY: u64 = 4;

fn fresh_store() -> (TempDir, SetStore) {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder().data_root(temp_dir.path()).build();
    let store = SetStore::open_named(&config, "bench").unwrap();
    (temp_dir, store)
}

fn workload() -> Vec<(String, String)> {
    (0..KEYS)
        .flat_map(|i| {
            (0..RECORDS_PER_KEY).map(move |isoform| {
                (
                    make_key("17", 7_500_000 + i, 'G', 'A'),
                    encode_record(Strand::Forward, 'R', 'H', 3 * i + 1, "exon1", isoform, false),
                )
            })
        })
        .collect()
}

fn storage_benchmarks(c: &mut Criterion) {
    let ops = workload();

    c.bench_function("direct_add", |b| {
        b.iter_batched(
            fresh_store,
            |(_temp, store)| {
                for (key, value) in &ops {
                    store.add(key, value).unwrap();
                }
            },
            BatchSize::PerIteration,
        )
    });

    c.bench_function("cached_add", |b| {
        b.iter_batched(
            fresh_store,
            |(_temp, mut store)| {
                let mut session = store.cache_session(MergeMode::MergeWithExisting);
                for (key, value) in &ops {
                    session.cached_add(key, value).unwrap();
                }
                session.finish().unwrap();
            },
            BatchSize::PerIteration,
        )
    });

    let (_temp, mut store) = fresh_store();
    {
        let mut session = store.cache_session(MergeMode::Overwrite);
        for (key, value) in &ops {
            session.cached_add(key, value).unwrap();
        }
        session.finish().unwrap();
    }

    c.bench_function("point_lookup", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = make_key("17", 7_500_000 + (i % KEYS), 'g', 'a');
            i += 1;
            store.members(&key).unwrap()
        })
    });
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);
