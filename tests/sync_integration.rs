//! End-to-end reconciliation behavior over a real file store and mirror
//! directory.

use notemark::api::NotemarkApi;
use notemark::store::fs::FileStore;
use notemark::sync::manifest::Manifest;
use notemark::sync::{PassAction, PassLock};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const FOLDER: &str = "Notes";

fn setup() -> (TempDir, TempDir, NotemarkApi<FileStore>) {
    let store_dir = tempdir().unwrap();
    let mirror_dir = tempdir().unwrap();
    let api = NotemarkApi::new(FileStore::new(store_dir.path().to_path_buf()));
    (store_dir, mirror_dir, api)
}

fn mirror_body(root: &Path, name: &str) -> String {
    let content = fs::read_to_string(root.join(name)).unwrap();
    let (_, body) = notemark::sync::mirror::parse(&content);
    body
}

fn edit_mirror_body(root: &Path, name: &str, find: &str, replace: &str) {
    let path = root.join(name);
    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, content.replace(find, replace)).unwrap();
}

#[test]
fn test_first_pass_exports_new_notes() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Trip plan\npack bags\n").unwrap();

    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();
    assert_eq!(summary.count(PassAction::CreatedFile), 1);
    assert_eq!(mirror_body(mirror.path(), "Trip plan.md"), "Trip plan\npack bags\n");
}

#[test]
fn test_second_pass_is_idempotent() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Stable\ncontent\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    let manifest_before = Manifest::load(mirror.path());
    let mtime_before = fs::metadata(mirror.path().join("Stable.md"))
        .unwrap()
        .modified()
        .unwrap();

    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();
    assert_eq!(summary.changed(), 0);
    assert_eq!(summary.count(PassAction::Unchanged), 1);
    assert_eq!(Manifest::load(mirror.path()), manifest_before);
    let mtime_after = fs::metadata(mirror.path().join("Stable.md"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(mtime_before, mtime_after);
}

#[test]
fn test_note_edit_propagates_to_file() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "List\nmilk\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    api.replace_in_note("1", "milk", "milk\neggs").unwrap();
    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();

    assert_eq!(summary.count(PassAction::UpdatedFile), 1);
    assert_eq!(mirror_body(mirror.path(), "List.md"), "List\nmilk\neggs\n");
}

#[test]
fn test_file_edit_propagates_to_note() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "List\nmilk\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    edit_mirror_body(mirror.path(), "List.md", "milk", "oat milk");
    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();

    assert_eq!(summary.count(PassAction::UpdatedNote), 1);
    let viewed = api.view_note("1").unwrap();
    assert_eq!(viewed.body_text.as_deref(), Some("List\noat milk\n"));
}

#[test]
fn test_disjoint_edits_on_both_sides_merge() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "List\nmilk\neggs\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    api.replace_in_note("1", "milk", "oat milk").unwrap();
    edit_mirror_body(mirror.path(), "List.md", "eggs", "bread");

    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();
    assert_eq!(summary.count(PassAction::Merged), 1);
    assert!(summary.conflicted().is_empty());

    let merged = "List\noat milk\nbread\n";
    assert_eq!(api.view_note("1").unwrap().body_text.as_deref(), Some(merged));
    assert_eq!(mirror_body(mirror.path(), "List.md"), merged);
}

#[test]
fn test_overlapping_edits_conflict_and_keep_both_hunks() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "List\nmilk\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    api.replace_in_note("1", "milk", "oat milk").unwrap();
    edit_mirror_body(mirror.path(), "List.md", "milk", "soy milk");
    let manifest_before = Manifest::load(mirror.path());

    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();
    assert_eq!(summary.conflicted().len(), 1);

    // The note keeps the side the engine resolved (the committed note side).
    assert_eq!(
        api.view_note("1").unwrap().body_text.as_deref(),
        Some("List\noat milk\n")
    );

    // The mirror file carries both hunks between markers.
    let body = mirror_body(mirror.path(), "List.md");
    assert!(body.contains("<<<<<<< notes"));
    assert!(body.contains("oat"));
    assert!(body.contains("======="));
    assert!(body.contains("soy"));
    assert!(body.contains(">>>>>>> file"));

    // The manifest entry was not advanced, so the next pass re-evaluates.
    let manifest_after = Manifest::load(mirror.path());
    assert_eq!(manifest_after, manifest_before);
}

#[test]
fn test_deleted_note_with_untouched_file_deletes_file() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Gone\nbody\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    api.delete_note("1").unwrap();
    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();

    assert_eq!(summary.count(PassAction::DeletedFile), 1);
    assert!(!mirror.path().join("Gone.md").exists());
    assert!(Manifest::load(mirror.path()).entries.is_empty());
}

#[test]
fn test_deleted_note_with_edited_file_recreates_note() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Keep me\noriginal\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    api.delete_note("1").unwrap();
    edit_mirror_body(mirror.path(), "Keep me.md", "original", "edited after delete");

    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();
    assert_eq!(summary.count(PassAction::CreatedNote), 1);
    assert_eq!(summary.count(PassAction::DeletedFile), 0);

    let viewed = api.view_note("1").unwrap();
    assert!(viewed
        .body_text
        .as_deref()
        .unwrap()
        .contains("edited after delete"));
}

#[test]
fn test_deleted_file_with_untouched_note_deletes_note() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Mirror gone\nbody\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    fs::remove_file(mirror.path().join("Mirror gone.md")).unwrap();
    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();

    assert_eq!(summary.count(PassAction::DeletedNote), 1);
    assert!(api.list_notes(None).unwrap().listed_notes.is_empty());
}

#[test]
fn test_plain_markdown_file_becomes_a_note() {
    let (_s, mirror, mut api) = setup();
    fs::create_dir_all(mirror.path().join("Work")).unwrap();
    fs::write(
        mirror.path().join("Work").join("Meeting.md"),
        "Meeting notes\nagenda\n",
    )
    .unwrap();

    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();
    assert_eq!(summary.count(PassAction::CreatedNote), 1);

    let listed = api.list_notes(Some("Work")).unwrap();
    assert_eq!(listed.listed_notes.len(), 1);
    assert_eq!(listed.listed_notes[0].note.title(), "Meeting notes");

    // The file was adopted: it now carries an id header.
    let content = fs::read_to_string(mirror.path().join("Work").join("Meeting.md")).unwrap();
    let (header, _) = notemark::sync::mirror::parse(&content);
    assert_eq!(header.unwrap().id, listed.listed_notes[0].note.id);
}

#[test]
fn test_title_edit_renames_mirror_file() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Old title\nbody\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();
    assert!(mirror.path().join("Old title.md").exists());

    api.replace_in_note("1", "Old title", "New title").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    assert!(!mirror.path().join("Old title.md").exists());
    assert_eq!(mirror_body(mirror.path(), "New title.md"), "New title\nbody\n");
}

#[test]
fn test_corrupt_manifest_never_deletes() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Survivor\nbody\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    fs::write(Manifest::path_in(mirror.path()), "{corrupt").unwrap();
    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();

    // Both sides identical, so the forced merge is clean and nothing is lost.
    assert!(summary.conflicted().is_empty());
    assert_eq!(api.list_notes(None).unwrap().listed_notes.len(), 1);
    assert!(mirror.path().join("Survivor.md").exists());
}

#[test]
fn test_backup_rewrites_unconditionally() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "A\none\n").unwrap();
    api.create_note(Some(FOLDER), "B\ntwo\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    // Scribble over one mirror file; backup restores it without merging.
    fs::write(mirror.path().join("A.md"), "scribbled\n").unwrap();
    let summary = api.sync_backup(mirror.path(), FOLDER).unwrap();

    assert_eq!(summary.count(PassAction::CreatedFile), 2);
    assert_eq!(mirror_body(mirror.path(), "A.md"), "A\none\n");
}

#[test]
fn test_colliding_titles_get_disambiguated_filenames() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Same\nfirst\n").unwrap();
    api.create_note(Some(FOLDER), "Same\nsecond\n").unwrap();

    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();
    assert_eq!(summary.count(PassAction::CreatedFile), 2);

    let names: Vec<String> = fs::read_dir(mirror.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.ends_with(".md"))
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Same.md".to_string()));
    assert!(names.iter().any(|n| n.starts_with("Same-") && n != "Same.md"));
}

#[test]
fn test_concurrent_pass_is_refused() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Locked\nbody\n").unwrap();

    let _held = PassLock::acquire(mirror.path()).unwrap();
    let result = api.sync_run(mirror.path(), FOLDER);
    assert!(matches!(
        result,
        Err(notemark::error::NotemarkError::SyncLocked(_))
    ));
}

#[test]
fn test_attachment_placeholders_survive_the_mirror() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Trip\nnotes\n").unwrap();
    api.attach("1", "map.png", None).unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();

    let body = mirror_body(mirror.path(), "Trip.md");
    assert!(body.contains("⟦attachment-0:map.png⟧"));

    // An external edit around the placeholder leaves the attachment intact.
    edit_mirror_body(mirror.path(), "Trip.md", "notes", "updated notes");
    api.sync_run(mirror.path(), FOLDER).unwrap();

    let atts = api.attachments("1").unwrap();
    assert_eq!(atts.attachments.len(), 1);
    assert_eq!(atts.attachments[0].name, "map.png");
}

#[test]
fn test_undecodable_note_is_skipped_not_deleted() {
    let (store_dir, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Fragile\nbody\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();
    let manifest_before = Manifest::load(mirror.path());
    let id = manifest_before.entries.keys().next().copied().unwrap();

    // Corrupt the stored unit stream behind the store's back.
    fs::write(
        store_dir.path().join(format!("note-{}.json", id)),
        "{corrupt",
    )
    .unwrap();

    let summary = api.sync_run(mirror.path(), FOLDER).unwrap();
    assert_eq!(summary.skipped().len(), 1);

    // Neither side was touched: no deletion, manifest entry intact.
    assert!(mirror.path().join("Fragile.md").exists());
    assert_eq!(Manifest::load(mirror.path()), manifest_before);
}

#[test]
fn test_sync_status_reports_without_writing() {
    let (_s, mirror, mut api) = setup();
    api.create_note(Some(FOLDER), "Watched\nbody\n").unwrap();
    api.sync_run(mirror.path(), FOLDER).unwrap();
    api.replace_in_note("1", "body", "new body").unwrap();

    let manifest_before = Manifest::load(mirror.path());
    let reports = api.sync_status(mirror.path(), FOLDER).unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].status,
        notemark::sync::detect::SyncStatus::NoteChanged
    );
    let diff = reports[0].diff.as_deref().unwrap();
    assert!(diff.contains("-body"));
    assert!(diff.contains("+new body"));

    // Status must not advance the manifest or touch the mirror.
    assert_eq!(Manifest::load(mirror.path()), manifest_before);
    assert_eq!(mirror_body(mirror.path(), "Watched.md"), "Watched\nbody\n");
}
