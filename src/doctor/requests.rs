use serde::Deserialize;

#[derive(Deserialize)]
pub struct SearchDoctorQuery {
    pub specialty: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
}

#[derive(Deserialize)]
pub struct DoctorAppointmentsQuery {
    pub date: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub specialty: String,
    pub department: Option<String>,
    pub qualification: Option<String>,
    #[serde(default)]
    pub experience_years: i32,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: Option<i32>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub max_patients: Option<i32>,
}

#[derive(Deserialize)]
pub struct SetSchedulesRequest {
    pub schedules: Vec<ScheduleInput>,
}
