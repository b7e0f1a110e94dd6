//! End-to-end scenarios: diff a pair of snapshots, journal the resulting
//! revision, and exercise the recovery-relevant orderings.

use remold::{
    FieldDescriptor, Journal, MigrationScript, Revision, RevisionSet, Runner, ScriptError, Snapshot, Status,
    TableDescriptor, diff_snapshots,
};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct NoopScript;

impl MigrationScript for NoopScript {
    fn up(&self) -> Result<(), ScriptError> {
        Ok(())
    }

    fn down(&self) -> Result<(), ScriptError> {
        Ok(())
    }
}

fn snapshot_with_t1() -> Snapshot {
    [TableDescriptor::new("T1").with_field(FieldDescriptor::new("f1", "varchar"))]
        .into_iter()
        .collect()
}

#[test]
fn drop_table_and_its_reverse() {
    init_logging();
    let old = snapshot_with_t1();
    let new = Snapshot::new();

    let forward = diff_snapshots(&new, &old);
    assert_eq!(forward.tables_to_drop, vec!["T1"]);
    assert!(forward.tables_to_create.is_empty());
    assert!(forward.fields_to_create.is_empty());
    assert!(forward.fields_to_drop.is_empty());
    assert!(forward.index_changes.is_empty());
    assert!(forward.nullability_changes.is_empty());

    // The reverse migration is the same diff with the snapshots swapped.
    let backward = diff_snapshots(&old, &new);
    assert_eq!(backward.tables_to_create, vec!["T1"]);
    assert!(backward.tables_to_drop.is_empty());
    // The created table carries f1 in the snapshot the emitter reads from.
    assert!(old.get("T1").unwrap().field("f1").is_some());
}

#[test]
fn generated_revision_flows_through_journal_to_up_to_date() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let journal = Journal::open(dir.path());

    // Two generated revisions, the second depending on the first.
    let init = Revision::new("1f3a9b", "init");
    let add_avatar = Revision::new("8c2d44", "add avatar").with_dependency("1f3a9b");
    let revisions: RevisionSet = [init.clone(), add_avatar.clone()].into_iter().collect();

    journal.mark_required(&init.hash, None).unwrap();
    journal.mark_required(&add_avatar.hash, Some(&init.hash)).unwrap();

    let runner = Runner::new(journal);
    assert_eq!(runner.pending(), vec!["1f3a9b", "8c2d44"]);

    let done = runner.up_to_date(&revisions, |_| NoopScript).unwrap();
    assert_eq!(done, vec!["1f3a9b", "8c2d44"]);
    assert!(runner.pending().is_empty());
    assert_eq!(runner.journal().check_status("8c2d44"), Status::Applied);
}

#[test]
fn required_ordering_survives_restart_with_interleaved_revisions() {
    init_logging();
    let dir = TempDir::new().unwrap();

    {
        let journal = Journal::open(dir.path());
        journal.mark_required("A", None).unwrap();
        journal.mark_required("X", None).unwrap();
        journal.mark_required("B", Some("A")).unwrap();
        journal.mark_required("Y", None).unwrap();
    }

    // Fresh handle simulating a process restart.
    let journal = Journal::open(dir.path());
    let required = journal.get_required();

    let pos_a = required.iter().position(|h| h == "A").unwrap();
    let pos_b = required.iter().position(|h| h == "B").unwrap();
    assert_eq!(pos_b, pos_a + 1, "B must directly follow A, got {required:?}");
}

#[test]
fn field_toggle_scenario_produces_drop_and_add() {
    init_logging();
    let old: Snapshot = [TableDescriptor::new("T1")
        .with_field(FieldDescriptor::new("f1", "varchar").indexed())]
    .into_iter()
    .collect();
    let new: Snapshot = [TableDescriptor::new("T1").with_field(FieldDescriptor::new("f1", "varchar").uniq())]
        .into_iter()
        .collect();

    let changes = diff_snapshots(&new, &old);

    let drops: Vec<_> = changes
        .index_changes
        .iter()
        .filter(|c| c.action == remold::IndexAction::Drop)
        .collect();
    let adds: Vec<_> = changes
        .index_changes
        .iter()
        .filter(|c| c.action == remold::IndexAction::Add)
        .collect();

    assert_eq!(drops.len(), 1);
    assert!(!drops[0].unique, "plain index must be dropped");
    assert_eq!(adds.len(), 1);
    assert!(adds[0].unique, "unique index must be added");
}

#[test]
fn diffing_never_mutates_snapshots() {
    init_logging();
    let old = snapshot_with_t1();
    let new: Snapshot = [TableDescriptor::new("T1")
        .with_field(FieldDescriptor::new("f1", "varchar").nullable())
        .with_field(FieldDescriptor::new("f2", "integer"))]
    .into_iter()
    .collect();

    let before_old = serde_json::to_string(&old).unwrap();
    let before_new = serde_json::to_string(&new).unwrap();

    let _ = diff_snapshots(&new, &old);
    let _ = diff_snapshots(&old, &new);

    assert_eq!(serde_json::to_string(&old).unwrap(), before_old);
    assert_eq!(serde_json::to_string(&new).unwrap(), before_new);
}
