//! Read-only catalog access.
//!
//! The catalog is an external collaborator: courses, categories, and
//! blog posts come from either a bundled JSON document or the HTTP mock
//! API, and nothing in this crate ever mutates them.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use course_core::model::{BlogPost, BlogPostId, Course, CourseId};

use crate::error::CatalogError;

/// Read-only course and blog lookup.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All courses in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError>;

    /// Fetch a course by id; `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, CatalogError>;

    /// Category labels known to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    async fn list_categories(&self) -> Result<Vec<String>, CatalogError>;

    /// Courses filtered to one category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    async fn list_courses_in_category(&self, category: &str) -> Result<Vec<Course>, CatalogError>;

    /// All blog posts; pure pass-through for the blog surface.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, CatalogError>;

    /// Fetch a blog post by id; `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when the catalog cannot be read.
    async fn get_blog_post(&self, id: &BlogPostId) -> Result<Option<BlogPost>, CatalogError>;
}

//
// ─── STATIC CATALOG ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Deserialize)]
struct CatalogData {
    courses: Vec<Course>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    blogs: Vec<BlogPost>,
}

/// Catalog backed by data owned in memory, in the shape of the bundled
/// db.json data file.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    data: CatalogData,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(courses: Vec<Course>, categories: Vec<String>, blogs: Vec<BlogPost>) -> Self {
        Self {
            data: CatalogData {
                courses,
                categories,
                blogs,
            },
        }
    }

    /// Parse a catalog from a db.json-shaped document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Malformed` when the document does not
    /// parse.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(raw)?;
        Ok(Self { data })
    }

    /// A small fixed catalog for demos and tests.
    ///
    /// # Panics
    ///
    /// Panics if the built-in fixture fails validation, which would be a
    /// bug in the fixture itself.
    #[must_use]
    pub fn sample() -> Self {
        fn course(
            id: &str,
            name: &str,
            description: &str,
            category: &str,
            lessons: &[(&str, &str, &str)],
        ) -> Course {
            Course::new(
                CourseId::new(id),
                name,
                description,
                category,
                format!("{id}.png"),
                lessons
                    .iter()
                    .map(|(lid, title, duration)| {
                        course_core::model::Lesson::new((*lid).into(), *title, *duration)
                    })
                    .collect(),
            )
            .expect("sample course should be valid")
        }

        let courses = vec![
            course(
                "c-web-101",
                "Modern Web Foundations",
                "HTML, CSS, and the DOM from the ground up.",
                "Web",
                &[
                    ("web-l1", "Anatomy of a Page", "25 min"),
                    ("web-l2", "Styling with CSS", "40 min"),
                    ("web-l3", "The DOM and Events", "35 min"),
                    ("web-l4", "Shipping a Site", "30 min"),
                ],
            ),
            course(
                "c-design-101",
                "Design Thinking Basics",
                "A practical introduction to user-centered design.",
                "Design",
                &[
                    ("design-l1", "Empathy and Research", "45 min"),
                    ("design-l2", "Prototype and Test", "50 min"),
                ],
            ),
            course(
                "c-data-101",
                "Data Analysis Fundamentals",
                "From raw tables to defensible conclusions.",
                "Data",
                &[
                    ("data-l1", "Cleaning Data", "30 min"),
                    ("data-l2", "Exploring Distributions", "35 min"),
                    ("data-l3", "Telling the Story", "25 min"),
                ],
            ),
        ];
        let categories = vec!["Web".into(), "Design".into(), "Data".into()];
        let blogs = vec![BlogPost {
            id: BlogPostId::new("b1"),
            title: "Learning in Public".into(),
            excerpt: "Why sharing progress keeps you honest.".into(),
            content: "Write about what you learn as you learn it.".into(),
            author: "SkillFrame Team".into(),
            date: "2024-01-15".into(),
            image: "b1.png".into(),
            tags: vec!["learning".into(), "habits".into()],
        }];

        Self::new(courses, categories, blogs)
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError> {
        Ok(self.data.courses.clone())
    }

    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, CatalogError> {
        Ok(self.data.courses.iter().find(|c| c.id() == id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        if !self.data.categories.is_empty() {
            return Ok(self.data.categories.clone());
        }
        // Derive from courses, first-seen order, when the document
        // carries no explicit category list.
        let mut categories: Vec<String> = Vec::new();
        for course in &self.data.courses {
            if !categories.iter().any(|c| c == course.category()) {
                categories.push(course.category().to_string());
            }
        }
        Ok(categories)
    }

    async fn list_courses_in_category(&self, category: &str) -> Result<Vec<Course>, CatalogError> {
        Ok(self
            .data
            .courses
            .iter()
            .filter(|c| c.category() == category)
            .cloned()
            .collect())
    }

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, CatalogError> {
        Ok(self.data.blogs.clone())
    }

    async fn get_blog_post(&self, id: &BlogPostId) -> Result<Option<BlogPost>, CatalogError> {
        Ok(self.data.blogs.iter().find(|b| &b.id == id).cloned())
    }
}

//
// ─── HTTP CATALOG ──────────────────────────────────────────────────────────────
//

/// Catalog served by the json-server mock API
/// (`/courses`, `/courses/:id`, `/categories`,
/// `/categories/:category/courses`, `/blogs`, `/blogs/:id`).
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let response = self.client.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CatalogError> {
        let response = self.client.get(self.url(path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }
        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError> {
        self.get_json("courses").await
    }

    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, CatalogError> {
        self.get_optional(&format!("courses/{id}")).await
    }

    async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.get_json("categories").await
    }

    async fn list_courses_in_category(&self, category: &str) -> Result<Vec<Course>, CatalogError> {
        self.get_json(&format!("categories/{category}/courses")).await
    }

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>, CatalogError> {
        self.get_json("blogs").await
    }

    async fn get_blog_post(&self, id: &BlogPostId) -> Result<Option<BlogPost>, CatalogError> {
        self.get_optional(&format!("blogs/{id}")).await
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_catalog_finds_courses_by_id() {
        let catalog = StaticCatalog::sample();
        let course = catalog
            .get_course(&CourseId::new("c-web-101"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(course.name(), "Modern Web Foundations");
        assert_eq!(course.total_lessons(), 4);

        assert!(catalog
            .get_course(&CourseId::new("missing"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn static_catalog_filters_by_category() {
        let catalog = StaticCatalog::sample();
        let web = catalog.list_courses_in_category("Web").await.unwrap();
        assert_eq!(web.len(), 1);
        assert_eq!(web[0].category(), "Web");
        assert!(catalog
            .list_courses_in_category("Nope")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn parses_db_json_shape() {
        let raw = r#"{
            "courses": [
                {
                    "id": "c1",
                    "name": "Course One",
                    "description": "",
                    "category": "Web",
                    "image": "c1.png",
                    "coursesDtl": [
                        { "id": "l1", "title": "Lesson", "duration": "10 min" }
                    ]
                }
            ],
            "categories": ["Web"],
            "blogs": []
        }"#;

        let catalog = StaticCatalog::from_json_str(raw).unwrap();
        assert_eq!(catalog.list_courses().await.unwrap().len(), 1);
        assert_eq!(catalog.list_categories().await.unwrap(), vec!["Web"]);
    }

    #[tokio::test]
    async fn derives_categories_when_document_has_none() {
        let raw = r#"{
            "courses": [
                { "id": "a", "name": "A", "category": "Web", "coursesDtl": [] },
                { "id": "b", "name": "B", "category": "Design", "coursesDtl": [] },
                { "id": "c", "name": "C", "category": "Web", "coursesDtl": [] }
            ]
        }"#;

        let catalog = StaticCatalog::from_json_str(raw).unwrap();
        assert_eq!(
            catalog.list_categories().await.unwrap(),
            vec!["Web", "Design"]
        );
    }

    #[test]
    fn rejects_malformed_catalog_documents() {
        let err = StaticCatalog::from_json_str("{oops").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }
}
