use super::table;
use crate::error::Result;
use crate::inventory::{CategoryDirectory, FileInventory, ModuleRegistry};
use crate::patterns::{FilePatterns, LEGACY_COMPONENT};
use crate::types::{ActivityKind, CandidateHit, ModuleDescriptor};
use apocalypse_db::{DbConnection, DbRow, DbValue};
use std::collections::{HashMap, HashSet};

/// Host platform tables read through a shared connection.
#[derive(Debug, Clone)]
pub struct SqliteHost {
    conn: DbConnection,
    prefix: String,
}

impl SqliteHost {
    pub fn new(conn: DbConnection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        table(&prefix, "files")?;
        Ok(Self { conn, prefix })
    }

    fn table(&self, name: &str) -> Result<String> {
        table(&self.prefix, name)
    }

    /// `(LOWER(f.filename) LIKE ? ESCAPE '\' OR ...)` plus its bound values.
    ///
    /// An empty pattern set matches nothing.
    fn filename_filter(patterns: &FilePatterns) -> (String, Vec<DbValue>) {
        let likes = patterns.like_patterns();
        if likes.is_empty() {
            return ("0".to_string(), Vec::new());
        }
        let clause = vec!["LOWER(f.filename) LIKE ? ESCAPE '\\'"; likes.len()].join(" OR ");
        (
            format!("({clause})"),
            likes.into_iter().map(DbValue::from).collect(),
        )
    }

    fn hit_from_row(row: &DbRow, kind: ActivityKind) -> Result<CandidateHit> {
        Ok(CandidateHit {
            context_id: row.get_by_name("contextid")?,
            course_id: row.get_by_name("courseid")?,
            course_full_name: row.get_by_name("coursefullname")?,
            category_path: row
                .get_by_name::<Option<String>>("categorypath")?
                .unwrap_or_default(),
            kind,
            activity_instance_id: row.get_by_name("instanceid")?,
            activity_name: row.get_by_name("activityname")?,
            html5_present: false,
        })
    }
}

impl ModuleRegistry for SqliteHost {
    fn modules(&self) -> Result<Vec<ModuleDescriptor>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", self.table("modules")?);
        self.conn
            .query_all(&sql, &[])?
            .iter()
            .map(|row| -> Result<ModuleDescriptor> {
                Ok(ModuleDescriptor::new(row.get(0)?, row.get::<String>(1)?))
            })
            .collect()
    }
}

impl FileInventory for SqliteHost {
    fn module_file_hits(
        &self,
        module: &ModuleDescriptor,
        patterns: &FilePatterns,
    ) -> Result<Vec<CandidateHit>> {
        let instance_table = self.table(&module.name)?;
        let (filter, filter_params) = Self::filename_filter(patterns);

        let sql = format!(
            "SELECT DISTINCT cx.id AS contextid, c.id AS courseid, c.fullname AS coursefullname, \
                    cat.path AS categorypath, cx.instanceid AS instanceid, s.name AS activityname \
             FROM {files} f \
             JOIN {context} cx ON cx.id = f.contextid \
             JOIN {course_modules} cm ON cm.id = cx.instanceid \
             JOIN {instance_table} s ON s.id = cm.instance \
             JOIN {course} c ON c.id = s.course \
             JOIN {categories} cat ON cat.id = c.category \
             WHERE f.component = ? AND cm.module = ? AND {filter} \
             ORDER BY contextid, instanceid",
            files = self.table("files")?,
            context = self.table("context")?,
            course_modules = self.table("course_modules")?,
            course = self.table("course")?,
            categories = self.table("course_categories")?,
        );

        let mut params = vec![DbValue::from(module.component()), DbValue::from(module.id)];
        params.extend(filter_params);

        let kind = ActivityKind::Module(module.name.clone());
        self.conn
            .query_all(&sql, &params)?
            .iter()
            .map(|row| Self::hit_from_row(row, kind.clone()))
            .collect()
    }

    fn course_file_hits(&self, patterns: &FilePatterns) -> Result<Vec<CandidateHit>> {
        let (filter, filter_params) = Self::filename_filter(patterns);
        let sql = format!(
            "SELECT DISTINCT cx.id AS contextid, c.id AS courseid, c.fullname AS coursefullname, \
                    cat.path AS categorypath, cx.instanceid AS instanceid, f.filename AS activityname \
             FROM {files} f \
             JOIN {context} cx ON cx.id = f.contextid \
             JOIN {course} c ON c.id = cx.instanceid \
             JOIN {categories} cat ON cat.id = c.category \
             WHERE f.component = ? AND {filter} \
             ORDER BY contextid, activityname",
            files = self.table("files")?,
            context = self.table("context")?,
            course = self.table("course")?,
            categories = self.table("course_categories")?,
        );

        let mut params = vec![DbValue::from(LEGACY_COMPONENT)];
        params.extend(filter_params);

        self.conn
            .query_all(&sql, &params)?
            .iter()
            .map(|row| Self::hit_from_row(row, ActivityKind::Legacy))
            .collect()
    }

    fn contexts_with_file(&self, filename: &str) -> Result<HashSet<i64>> {
        let sql = format!(
            "SELECT DISTINCT contextid FROM {} WHERE filename = ?",
            self.table("files")?
        );
        self.conn
            .query_all(&sql, &[DbValue::from(filename)])?
            .iter()
            .map(|row| -> Result<i64> { Ok(row.get(0)?) })
            .collect()
    }
}

impl CategoryDirectory for SqliteHost {
    fn category_names(&self) -> Result<HashMap<i64, String>> {
        let sql = format!("SELECT id, name FROM {}", self.table("course_categories")?);
        self.conn
            .query_all(&sql, &[])?
            .iter()
            .map(|row| -> Result<(i64, String)> { Ok((row.get(0)?, row.get(1)?)) })
            .collect()
    }
}
