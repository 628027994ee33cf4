use serde::Serialize;

use crate::models::sch_stories::Story;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Story> for StoryItem {
    fn from(data: Story) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            video_url: data.video_url,
            image_url: data.image_url,
            is_active: data.is_active,
            created_at: crate::utils::format_time_str(&data.created_at),
            updated_at: crate::utils::format_time_str(&data.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct StoriesResponse {
    pub stories: Vec<StoryItem>,
}

/// `story` is `null` when nothing is featured.
#[derive(Serialize)]
pub struct ActiveStoryResponse {
    pub story: Option<StoryItem>,
}

#[derive(Serialize)]
pub struct StoryResponse {
    pub story: StoryItem,
}
