use criterion::{criterion_group, criterion_main, Criterion};

use models::EntityKind;
use service::storage::FileStorage;
use service::ResourceService;

fn bench_resources(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let path = std::env::temp_dir().join(format!("hbnb_bench_{}.json", uuid::Uuid::new_v4()));
    let svc = ResourceService::new(rt.block_on(FileStorage::open(&path)).unwrap());

    // a few hundred states so each flush writes a realistic document
    for i in 0..300 {
        let body =
            serde_json::to_vec(&serde_json::json!({ "name": format!("State {i}") })).unwrap();
        rt.block_on(svc.create(EntityKind::State, None, &body)).unwrap();
    }

    c.bench_function("amenity_create_and_flush", |b| {
        let body = br#"{"name": "Bench"}"#;
        b.iter(|| rt.block_on(svc.create(EntityKind::Amenity, None, body)).unwrap());
    });

    c.bench_function("state_list_sorted", |b| {
        b.iter(|| rt.block_on(svc.list(EntityKind::State)));
    });

    let _ = std::fs::remove_file(&path);
}

criterion_group!(benches, bench_resources);
criterion_main!(benches);
