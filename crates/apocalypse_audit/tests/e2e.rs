//! Full audit against a Moodle-shaped SQLite database.

mod common;

use apocalypse_audit::{
    ActivityKind, AuditPersistence, AuditRunner, FlashAudit, ModuleRegistry, SiteUrls,
    SortColumn, SortOrder, SqliteAuditStore, SqliteHost,
};
use common::{physics_site, HostFixture, PREFIX, SITE};

fn open(host: &HostFixture) -> (SqliteHost, SqliteAuditStore) {
    let sqlite_host = SqliteHost::new(host.conn.clone(), PREFIX).unwrap();
    let store = SqliteAuditStore::open(host.conn.clone(), PREFIX).unwrap();
    (sqlite_host, store)
}

#[test]
fn test_three_flash_files_across_two_modules_and_legacy() {
    let (mut host, course_context) = physics_site();
    let scorm_context = host.add_activity(1, "scorm", 7, 70, 2, "Pendulum lab");
    let resource_context = host.add_activity(2, "resource", 8, 80, 2, "Lecture video");
    host.add_file(scorm_context, "mod_scorm", "pendulum.SWF");
    host.add_file(scorm_context, "mod_scorm", "index_lms_html5.html");
    host.add_file(resource_context, "mod_resource", "lecture.flv");
    host.add_file(resource_context, "mod_resource", "notes.pdf");
    host.add_file(course_context, "course", "intro.fla");

    let (sqlite_host, store) = open(&host);
    let urls = SiteUrls::new(SITE).unwrap();
    let audit = FlashAudit::new(&sqlite_host, &sqlite_host, &sqlite_host, &store, urls);

    let summary = audit.run_at(1_700_000_000).unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(store.count().unwrap(), 3);

    let records = store
        .list_page(0, 0, SortOrder::asc(SortColumn::Type))
        .unwrap();
    let by_type: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.activity_type.as_str(), r.activity_name.as_str()))
        .collect();
    assert_eq!(
        by_type,
        vec![
            ("legacy", "intro.fla"),
            ("resource", "Lecture video"),
            ("scorm", "Pendulum lab"),
        ]
    );

    let legacy = &records[0];
    assert_eq!(legacy.activity_type, ActivityKind::Legacy);
    assert_eq!(legacy.category, "Science / Physics");
    assert_eq!(legacy.course_full_name, "Physics 101");
    assert_eq!(legacy.course_url, "http://lms.test/course/view.php?id=2");
    assert_eq!(
        legacy.activity_url,
        format!("http://lms.test/files/index.php?contextid={course_context}")
    );
    assert!(!legacy.html5_present);

    let resource = &records[1];
    assert_eq!(resource.activity_url, "http://lms.test/mod/resource/view.php?id=8");
    assert!(!resource.html5_present);

    let scorm = &records[2];
    assert_eq!(scorm.activity_url, "http://lms.test/mod/scorm/view.php?id=7");
    assert!(scorm.html5_present);

    let runs = store.list_runs(0).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_at, 1_700_000_000);
    assert_eq!(runs[0].flash_activity_count, 3);
}

#[test]
fn test_site_without_flash_records_zero_count_run() {
    let (mut host, course_context) = physics_site();
    let scorm_context = host.add_activity(1, "scorm", 7, 70, 2, "Pendulum lab");
    host.add_file(scorm_context, "mod_scorm", "pendulum.html");
    host.add_file(course_context, "course", "syllabus.pdf");

    let (sqlite_host, store) = open(&host);
    let audit = FlashAudit::new(
        &sqlite_host,
        &sqlite_host,
        &sqlite_host,
        &store,
        SiteUrls::new(SITE).unwrap(),
    );

    let summary = audit.run().unwrap();
    assert_eq!(summary.count, 0);
    assert_eq!(store.count().unwrap(), 0);
    assert_eq!(store.last_run().unwrap().unwrap().flash_activity_count, 0);
}

#[test]
fn test_several_files_in_one_activity_yield_one_record() {
    let (mut host, _) = physics_site();
    let scorm_context = host.add_activity(1, "scorm", 7, 70, 2, "Pendulum lab");
    host.add_file(scorm_context, "mod_scorm", "a.swf");
    host.add_file(scorm_context, "mod_scorm", "b.swf");
    host.add_file(scorm_context, "mod_scorm", "c.flv");

    let (sqlite_host, store) = open(&host);
    let audit = FlashAudit::new(
        &sqlite_host,
        &sqlite_host,
        &sqlite_host,
        &store,
        SiteUrls::new(SITE).unwrap(),
    );

    assert_eq!(audit.run().unwrap().count, 1);
}

#[test]
fn test_courses_in_unknown_categories_are_excluded() {
    let mut host = HostFixture::new();
    host.add_module(1, "scorm");
    host.add_course(3, 404, "Orphan course");
    let context = host.add_activity(1, "scorm", 9, 90, 3, "Lost lab");
    host.add_file(context, "mod_scorm", "lost.swf");

    let (sqlite_host, store) = open(&host);
    let audit = FlashAudit::new(
        &sqlite_host,
        &sqlite_host,
        &sqlite_host,
        &store,
        SiteUrls::new(SITE).unwrap(),
    );

    assert_eq!(audit.run().unwrap().count, 0);
}

#[test]
fn test_rerun_replaces_previous_snapshot() {
    let (mut host, course_context) = physics_site();
    host.add_file(course_context, "course", "one.swf");
    host.add_file(course_context, "course", "two.swf");

    let (sqlite_host, store) = open(&host);
    let audit = FlashAudit::new(
        &sqlite_host,
        &sqlite_host,
        &sqlite_host,
        &store,
        SiteUrls::new(SITE).unwrap(),
    );
    assert_eq!(audit.run_at(100).unwrap().count, 2);

    host.conn
        .execute("DELETE FROM mdl_files WHERE filename = 'two.swf'", &[])
        .unwrap();
    assert_eq!(audit.run_at(200).unwrap().count, 1);

    let names: Vec<String> = store
        .list_page(0, 0, SortOrder::default())
        .unwrap()
        .into_iter()
        .map(|r| r.activity_name)
        .collect();
    assert_eq!(names, vec!["one.swf"]);
    assert_eq!(store.list_runs(0).unwrap().len(), 2);
}

#[test]
fn test_retention_prunes_old_runs() {
    let (host, _) = physics_site();
    let (sqlite_host, store) = open(&host);
    let audit = FlashAudit::new(
        &sqlite_host,
        &sqlite_host,
        &sqlite_host,
        &store,
        SiteUrls::new(SITE).unwrap(),
    )
    .with_retention(Some(2));

    for ts in [10, 20, 30, 40] {
        audit.run_at(ts).unwrap();
    }

    let kept: Vec<i64> = store.list_runs(0).unwrap().iter().map(|r| r.run_at).collect();
    assert_eq!(kept, vec![40, 30]);
}

#[test]
fn test_missing_module_table_aborts_audit() {
    let (mut host, course_context) = physics_site();
    host.add_file(course_context, "course", "intro.swf");
    host.conn
        .execute("INSERT INTO mdl_modules (id, name) VALUES (3, 'ghost')", &[])
        .unwrap();

    let (sqlite_host, store) = open(&host);
    assert_eq!(sqlite_host.modules().unwrap().len(), 3);
    let audit = FlashAudit::new(
        &sqlite_host,
        &sqlite_host,
        &sqlite_host,
        &store,
        SiteUrls::new(SITE).unwrap(),
    );

    assert!(audit.run().is_err());
    assert_eq!(store.count().unwrap(), 0);
    assert!(store.last_run().unwrap().is_none());
}
