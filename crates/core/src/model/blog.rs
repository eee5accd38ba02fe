use serde::{Deserialize, Serialize};

use crate::model::ids::BlogPostId;

/// A blog post from the catalog.
///
/// Pure pass-through content: nothing in the progress core reads these
/// fields, they are carried for the blog surface only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
