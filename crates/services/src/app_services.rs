use std::sync::Arc;

use course_core::Clock;
use storage::repository::Storage;

use crate::catalog::CatalogProvider;
use crate::certificate_service::CertificateService;
use crate::course_service::CourseService;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::player_service::PlayerService;
use crate::progress_service::ProgressService;

/// Assembles the app-facing services over a catalog and a progress
/// store.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<dyn CatalogProvider>,
    progress: ProgressService,
    courses: Arc<CourseService>,
    dashboard: Arc<DashboardService>,
    player: Arc<PlayerService>,
    certificates: Arc<CertificateService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and load the progress
    /// records.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    /// A readable-but-corrupt progress record is not an error: the
    /// store starts from empty state instead.
    pub async fn new_sqlite(
        db_url: &str,
        catalog: Arc<dyn CatalogProvider>,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let progress = ProgressService::new(Arc::clone(&storage.progress));
        progress.load().await;
        Ok(Self::assemble(catalog, progress, clock))
    }

    /// Build services over an in-memory store, for tests and demos.
    pub async fn new_in_memory(catalog: Arc<dyn CatalogProvider>, clock: Clock) -> Self {
        let progress = ProgressService::in_memory();
        progress.load().await;
        Self::assemble(catalog, progress, clock)
    }

    fn assemble(catalog: Arc<dyn CatalogProvider>, progress: ProgressService, clock: Clock) -> Self {
        let courses = Arc::new(CourseService::new(
            Arc::clone(&catalog),
            progress.clone(),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&catalog),
            progress.clone(),
        ));
        let player = Arc::new(PlayerService::new(Arc::clone(&catalog), progress.clone()));
        let certificates = Arc::new(CertificateService::new(
            clock,
            Arc::clone(&catalog),
            progress.clone(),
        ));

        Self {
            catalog,
            progress,
            courses,
            dashboard,
            player,
            certificates,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<dyn CatalogProvider> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> ProgressService {
        self.progress.clone()
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn player(&self) -> Arc<PlayerService> {
        Arc::clone(&self.player)
    }

    #[must_use]
    pub fn certificates(&self) -> Arc<CertificateService> {
        Arc::clone(&self.certificates)
    }
}
