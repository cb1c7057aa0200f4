use assert_fs::TempDir;
use assert_fs::prelude::*;
use task_cli::{Error, JsonFileStore, Status, TaskId, TaskStore, TaskTracker};

struct TestContext {
    dir: TempDir,
    store: JsonFileStore,
}

fn setup() -> TestContext {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = JsonFileStore::new(dir.child("tasks.json").path());
    TestContext { dir, store }
}

#[test]
fn buy_milk_scenario() {
    let ctx = setup();
    let tracker = TaskTracker::new(&ctx.store);

    let id = tracker.add("buy milk").expect("Failed to add task");
    let all = tracker.list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].description(), "buy milk");
    assert_eq!(all[0].status(), Status::Pending);

    tracker.mark_done(&id).unwrap();
    let done = tracker.list_by_status(Status::Done).unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id(), &id);

    tracker.delete(&id).unwrap();
    assert!(tracker.list_all().unwrap().is_empty());
}

#[test]
fn each_operation_is_persisted() {
    let ctx = setup();
    let id = TaskTracker::new(&ctx.store).add("persisted").unwrap();

    // A second tracker on a fresh store sees only what was written to disk.
    let reopened = JsonFileStore::new(ctx.store.path());
    let tracker = TaskTracker::new(&reopened);
    tracker.mark_in_progress(&id).unwrap();
    tracker.update(&id, "persisted, renamed").unwrap();

    let tasks = ctx.store.load().unwrap();
    let task = tasks.find(&id).unwrap();
    assert_eq!(task.description(), "persisted, renamed");
    assert_eq!(task.status(), Status::InProgress);
    assert!(task.updated_at() >= task.created_at());
}

#[test]
fn ids_are_unique_across_invocations() {
    let ctx = setup();

    let ids: std::collections::HashSet<TaskId> = (0..20)
        .map(|i| {
            TaskTracker::new(&JsonFileStore::new(ctx.store.path()))
                .add(&format!("task {i}"))
                .unwrap()
        })
        .collect();

    assert_eq!(ids.len(), 20);
}

#[test]
fn not_found_leaves_collection_unmodified() {
    let ctx = setup();
    let tracker = TaskTracker::new(&ctx.store);
    tracker.add("one").unwrap();
    tracker.add("two").unwrap();
    let before = tracker.list_all().unwrap();
    let missing = TaskId::from("00000000-0000-0000-0000-000000000000");

    assert!(matches!(tracker.update(&missing, "x"), Err(Error::NotFound(_))));
    assert!(matches!(tracker.delete(&missing), Err(Error::NotFound(_))));
    assert!(matches!(tracker.mark_done(&missing), Err(Error::NotFound(_))));
    assert!(matches!(
        tracker.mark_in_progress(&missing),
        Err(Error::NotFound(_))
    ));

    assert_eq!(tracker.list_all().unwrap(), before);
}

#[test]
fn reads_legacy_task_files() {
    let ctx = setup();
    ctx.dir
        .child("tasks.json")
        .write_str(
            r#"[
  {
    "id": "6f0e4c6a-8d4b-4c55-9a53-1f8e2d7b9c10",
    "task": "legacy task",
    "status": "in progress",
    "createdAt": "2024-11-02T16:20:31.512Z",
    "updatedAt": "2024-11-02T16:20:31.512Z"
  }
]"#,
        )
        .unwrap();
    let tracker = TaskTracker::new(&ctx.store);

    let in_progress = tracker.list_by_status(Status::InProgress).unwrap();

    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].description(), "legacy task");
}
