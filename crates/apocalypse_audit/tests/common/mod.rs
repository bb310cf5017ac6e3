//! Moodle-shaped host schema in a temporary SQLite file.

#![allow(dead_code)]

use apocalypse_db::{DbConnection, DbValue};
use std::path::PathBuf;
use tempfile::TempDir;

pub const PREFIX: &str = "mdl_";
pub const SITE: &str = "http://lms.test";

const CONTEXT_COURSE: i64 = 50;
const CONTEXT_MODULE: i64 = 70;

pub struct HostFixture {
    _dir: TempDir,
    pub db_path: PathBuf,
    pub conn: DbConnection,
    next_context: i64,
    next_file: i64,
}

impl HostFixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let db_path = dir.path().join("lms.sqlite3");
        let conn = DbConnection::open(&db_path).expect("open fixture db");
        conn.execute_batch(
            r#"
            CREATE TABLE mdl_course_categories (id INTEGER PRIMARY KEY, name TEXT NOT NULL, path TEXT NOT NULL);
            CREATE TABLE mdl_course (id INTEGER PRIMARY KEY, category INTEGER NOT NULL, fullname TEXT NOT NULL);
            CREATE TABLE mdl_modules (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
            CREATE TABLE mdl_course_modules (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, module INTEGER NOT NULL, instance INTEGER NOT NULL);
            CREATE TABLE mdl_context (id INTEGER PRIMARY KEY, contextlevel INTEGER NOT NULL, instanceid INTEGER NOT NULL);
            CREATE TABLE mdl_files (
                id INTEGER PRIMARY KEY,
                contextid INTEGER NOT NULL,
                component TEXT NOT NULL,
                filearea TEXT NOT NULL,
                filename TEXT NOT NULL
            );
            "#,
        )
        .expect("create host schema");

        Self {
            _dir: dir,
            db_path,
            conn,
            next_context: 1000,
            next_file: 1,
        }
    }

    pub fn add_category(&self, id: i64, name: &str, path: &str) {
        self.conn
            .execute(
                "INSERT INTO mdl_course_categories (id, name, path) VALUES (?, ?, ?)",
                &[DbValue::from(id), name.into(), path.into()],
            )
            .expect("insert category");
    }

    /// Insert a course and its course-level context. Returns the context id.
    pub fn add_course(&mut self, id: i64, category: i64, fullname: &str) -> i64 {
        self.conn
            .execute(
                "INSERT INTO mdl_course (id, category, fullname) VALUES (?, ?, ?)",
                &[DbValue::from(id), category.into(), fullname.into()],
            )
            .expect("insert course");
        self.add_context(CONTEXT_COURSE, id)
    }

    /// Register a module type and create its instance table.
    pub fn add_module(&self, id: i64, name: &str) {
        self.conn
            .execute(
                "INSERT INTO mdl_modules (id, name) VALUES (?, ?)",
                &[DbValue::from(id), name.into()],
            )
            .expect("insert module");
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE mdl_{name} (id INTEGER PRIMARY KEY, course INTEGER NOT NULL, name TEXT NOT NULL)"
            ))
            .expect("create module table");
    }

    /// Insert a module instance, its course module and module context.
    /// Returns the context id.
    pub fn add_activity(
        &mut self,
        module_id: i64,
        module: &str,
        cm_id: i64,
        instance_id: i64,
        course: i64,
        name: &str,
    ) -> i64 {
        self.conn
            .execute(
                &format!("INSERT INTO mdl_{module} (id, course, name) VALUES (?, ?, ?)"),
                &[DbValue::from(instance_id), course.into(), name.into()],
            )
            .expect("insert module instance");
        self.conn
            .execute(
                "INSERT INTO mdl_course_modules (id, course, module, instance) VALUES (?, ?, ?, ?)",
                &[DbValue::from(cm_id), course.into(), module_id.into(), instance_id.into()],
            )
            .expect("insert course module");
        self.add_context(CONTEXT_MODULE, cm_id)
    }

    pub fn add_file(&mut self, context_id: i64, component: &str, filename: &str) {
        let id = self.next_file;
        self.next_file += 1;
        let filearea = if component == "course" { "legacy" } else { "content" };
        self.conn
            .execute(
                "INSERT INTO mdl_files (id, contextid, component, filearea, filename) VALUES (?, ?, ?, ?, ?)",
                &[
                    DbValue::from(id),
                    DbValue::from(context_id),
                    DbValue::from(component),
                    DbValue::from(filearea),
                    DbValue::from(filename),
                ],
            )
            .expect("insert file");
    }

    fn add_context(&mut self, level: i64, instance_id: i64) -> i64 {
        let id = self.next_context;
        self.next_context += 1;
        self.conn
            .execute(
                "INSERT INTO mdl_context (id, contextlevel, instanceid) VALUES (?, ?, ?)",
                &[DbValue::from(id), level.into(), instance_id.into()],
            )
            .expect("insert context");
        id
    }
}

/// Science / Physics with one course (id 2) and `scorm` + `resource` modules.
pub fn physics_site() -> (HostFixture, i64) {
    let mut host = HostFixture::new();
    host.add_category(5, "Science", "/5");
    host.add_category(12, "Physics", "/5/12");
    let course_context = host.add_course(2, 12, "Physics 101");
    host.add_module(1, "scorm");
    host.add_module(2, "resource");
    (host, course_context)
}
