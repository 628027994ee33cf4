use serde::Serialize;

use crate::models::news::NewsData;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: String,
    pub author_id: Option<i32>,
    pub is_published: bool,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NewsData> for NewsItem {
    fn from(data: NewsData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            slug: data.slug,
            excerpt: data.excerpt,
            content: data.content,
            image_url: data.image_url,
            category: data.category,
            author_id: data.author_id,
            is_published: data.is_published,
            published_at: crate::utils::format_time_str_opt(&data.published_at),
            created_at: crate::utils::format_time_str(&data.created_at),
            updated_at: crate::utils::format_time_str(&data.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct NewsListResponse {
    pub news: Vec<NewsItem>,
    pub total: i64,
}

#[derive(Serialize)]
pub struct ArticleResponse {
    pub article: NewsItem,
}
