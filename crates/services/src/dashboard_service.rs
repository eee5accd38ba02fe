use std::sync::Arc;

use course_core::model::Course;
use course_core::projection::{self, AggregateStats, CourseProgressView};

use crate::catalog::CatalogProvider;
use crate::error::CatalogError;
use crate::progress_service::ProgressService;

/// One enrolled course with its derived progress, as listed on the
/// account page tabs.
#[derive(Debug, Clone)]
pub struct CourseProgressItem {
    pub course: Course,
    pub progress: CourseProgressView,
}

/// The account dashboard: enrolled courses split by completion, plus
/// aggregate statistics.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Enrolled courses below 100%, catalog order ("Continue Learning").
    pub in_progress: Vec<CourseProgressItem>,
    /// Enrolled courses at 100% ("Completed Courses").
    pub completed: Vec<CourseProgressItem>,
    pub stats: AggregateStats,
}

/// Derives the account dashboard from the catalog and a progress
/// snapshot. Stateless: recomputed on every call.
#[derive(Clone)]
pub struct DashboardService {
    catalog: Arc<dyn CatalogProvider>,
    progress: ProgressService,
}

impl DashboardService {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogProvider>, progress: ProgressService) -> Self {
        Self { catalog, progress }
    }

    /// Build the dashboard view.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    pub async fn dashboard(&self) -> Result<DashboardView, CatalogError> {
        let courses = self.catalog.list_courses().await?;
        let state = self.progress.snapshot();

        let stats = projection::project_aggregate(&courses, &state);

        let mut in_progress = Vec::new();
        let mut completed = Vec::new();
        for course in courses {
            let view = projection::project_course(&course, &state);
            if !view.is_enrolled {
                continue;
            }
            let item = CourseProgressItem {
                course,
                progress: view,
            };
            if item.progress.is_complete {
                completed.push(item);
            } else {
                in_progress.push(item);
            }
        }

        Ok(DashboardView {
            in_progress,
            completed,
            stats,
        })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
