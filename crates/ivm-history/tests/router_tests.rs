use ivm_history::{
    HistoryRouter, Identity, InMemoryRemoteStore, JsonFileStore, LocalStore, MemoryStore,
    SessionRecord, DEFAULT_CAPACITY,
};
use std::sync::Arc;

fn record(n: usize) -> SessionRecord {
    SessionRecord::new(format!("Company {n}"), vec![format!("Question {n}")])
}

#[tokio::test]
async fn guest_save_over_capacity_drops_oldest() {
    let local = MemoryStore::new();
    let seeded: Vec<_> = (0..21).map(record).collect();
    local.write(&seeded).unwrap();

    let router = HistoryRouter::new(local, Arc::new(InMemoryRemoteStore::new()), DEFAULT_CAPACITY);
    router.save(None, record(21)).await;

    let kept = router.load(None).await;
    assert_eq!(kept.len(), 20);
    assert_eq!(kept.first().unwrap().company, "Company 2");
    assert_eq!(kept.last().unwrap().company, "Company 21");
}

#[tokio::test]
async fn signed_in_history_is_unbounded_and_separate() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let router = HistoryRouter::new(MemoryStore::new(), remote.clone(), DEFAULT_CAPACITY);
    let ada = Identity::new("ada");

    for n in 0..25 {
        router.save(Some(&ada), record(n)).await;
    }

    assert_eq!(router.load(Some(&ada)).await.len(), 25);
    assert_eq!(remote.count("ada"), 25);
    assert!(router.load(None).await.is_empty());
}

#[tokio::test]
async fn file_backed_guest_history_survives_new_router() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    {
        let router = HistoryRouter::new(
            JsonFileStore::new(&path),
            Arc::new(InMemoryRemoteStore::new()),
            DEFAULT_CAPACITY,
        );
        router.save(None, record(1)).await;
        router.save(None, record(2)).await;
    }

    let router = HistoryRouter::new(
        JsonFileStore::new(&path),
        Arc::new(InMemoryRemoteStore::new()),
        DEFAULT_CAPACITY,
    );
    let companies: Vec<_> = router
        .load_local()
        .into_iter()
        .map(|r| r.company)
        .collect();
    assert_eq!(companies, vec!["Company 1", "Company 2"]);
}

#[tokio::test]
async fn corrupt_file_reads_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, b"[{\"broken\":").unwrap();

    let router = HistoryRouter::new(
        JsonFileStore::new(&path),
        Arc::new(InMemoryRemoteStore::new()),
        DEFAULT_CAPACITY,
    );
    assert!(router.load(None).await.is_empty());

    router.save(None, record(1)).await;
    assert_eq!(router.load(None).await.len(), 1);
}
