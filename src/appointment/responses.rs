use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentItem {
    pub id: i32,
    pub patient_id: i32,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: Option<String>,
    pub doctor_id: i32,
    pub doctor_name: String,
    pub specialty: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub appointment: AppointmentItem,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<AppointmentItem>,
}

#[derive(Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentItem>,
    pub total: i64,
}
