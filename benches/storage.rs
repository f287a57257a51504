use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use serde_json::json;
use tempfile::tempdir;

use hbnb::{FileStorage, Model, StorageConfig, TypeRegistry};

const OBJECTS: usize = 1_000;

fn populated_store(path: std::path::PathBuf) -> FileStorage {
    let config = StorageConfig {
        file_path: path,
        // fsync cost dominates otherwise and is not what we measure.
        sync_on_write: false,
    };
    let mut storage = FileStorage::open(config, TypeRegistry::builtin()).unwrap();
    for i in 0..OBJECTS {
        let mut model = Model::base();
        model.set_attribute("name", format!("model_{i}")).unwrap();
        model.set_attribute("number", i).unwrap();
        model.set_attribute("tags", json!(["a", "b", "c"])).unwrap();
        storage.add(model);
    }
    storage
}

fn bench_save(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let storage = populated_store(dir.path().join("file.json"));

    let mut group = c.benchmark_group("storage");
    group.throughput(Throughput::Elements(OBJECTS as u64));
    group.bench_function("save_1k", |b| b.iter(|| storage.save().unwrap()));
    group.finish();
}

fn bench_reload(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("file.json");
    populated_store(path.clone()).save().unwrap();

    let mut group = c.benchmark_group("storage");
    group.throughput(Throughput::Elements(OBJECTS as u64));
    group.bench_function("reload_1k", |b| {
        b.iter_batched(
            || FileStorage::open(StorageConfig::new(path.clone()), TypeRegistry::builtin()).unwrap(),
            |mut storage| {
                let report = storage.reload().unwrap();
                assert_eq!(report.loaded, OBJECTS);
                storage
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_save, bench_reload);
criterion_main!(benches);
