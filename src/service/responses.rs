use serde::Serialize;

use crate::models::services::ServiceData;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ServiceData> for ServiceItem {
    fn from(data: ServiceData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            slug: data.slug,
            description: data.description,
            icon: data.icon,
            image_url: data.image_url,
            display_order: data.display_order,
            is_active: data.is_active,
            created_at: crate::utils::format_time_str(&data.created_at),
            updated_at: crate::utils::format_time_str(&data.updated_at),
        }
    }
}

#[derive(Serialize)]
pub struct ServicesResponse {
    pub services: Vec<ServiceItem>,
}

#[derive(Serialize)]
pub struct ServiceResponse {
    pub service: ServiceItem,
}
