//! Links into the host site.

use crate::error::Result;
use crate::types::ActivityKind;
use url::Url;

/// Builds course and activity links relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    /// `site_url` may include a sub-path, e.g. `https://lms.example.edu/moodle`.
    pub fn new(site_url: &str) -> Result<Self> {
        let trimmed = site_url.trim();
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        Ok(Self {
            base: Url::parse(&with_slash)?,
        })
    }

    /// `<site>/course/view.php?id=<course_id>`
    pub fn course_url(&self, course_id: i64) -> Result<String> {
        self.page("course/view.php", "id", course_id)
    }

    /// Legacy files link to the course file browser for their context;
    /// module hits link to the activity's view page.
    pub fn activity_url(
        &self,
        kind: &ActivityKind,
        activity_instance_id: i64,
        context_id: i64,
    ) -> Result<String> {
        match kind {
            ActivityKind::Legacy => self.page("files/index.php", "contextid", context_id),
            ActivityKind::Module(name) => {
                self.page(&format!("mod/{name}/view.php"), "id", activity_instance_id)
            }
        }
    }

    fn page(&self, path: &str, key: &str, value: i64) -> Result<String> {
        let mut url = self.base.join(path)?;
        url.query_pairs_mut().append_pair(key, &value.to_string());
        Ok(url.into())
    }
}
