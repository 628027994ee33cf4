use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoryRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}
