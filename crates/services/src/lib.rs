#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod certificate_service;
pub mod course_service;
pub mod dashboard_service;
pub mod error;
pub mod player_service;
pub mod progress_service;

pub use course_core::Clock;

pub use app_services::AppServices;
pub use catalog::{CatalogProvider, HttpCatalog, StaticCatalog};
pub use certificate_service::{Certificate, CertificateService};
pub use course_service::{CourseDetailView, CourseService};
pub use dashboard_service::{CourseProgressItem, DashboardService, DashboardView};
pub use error::{AppServicesError, CatalogError, CertificateError, PlayerError};
pub use player_service::{LessonContext, PlayerService};
pub use progress_service::ProgressService;
