//! Public course catalogue.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::backend::Backend;
use crate::entities::Course;
use crate::filters;
use crate::repositories::CourseRepository;

pub struct CourseService {
    backend: Arc<dyn Backend>,
}

/// Published courses plus the category chips derived from them.
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    pub courses: Vec<Course>,
    pub categories: Vec<String>,
}

impl CourseService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Published courses with their subject names, newest first.
    pub async fn published(&self) -> Result<Vec<Course>> {
        CourseRepository::get_published(self.backend.as_ref(), None)
            .await
            .context("Failed to load courses")
    }

    /// Published courses matching `search` and `category` (`All` for every one).
    pub async fn catalogue(&self, search: &str, category: &str) -> Result<Catalogue> {
        let courses = self.published().await?;
        Ok(Catalogue {
            categories: filters::course_categories(&courses),
            courses: filters::filter_courses(&courses, search.trim(), category),
        })
    }
}
