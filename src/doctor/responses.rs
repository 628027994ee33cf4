use serde::Serialize;

use crate::{
    appointment::responses::AppointmentItem,
    models::{
        doctor_schedules::{Schedule, DAY_NAMES},
        doctors::Doctor,
        users::User,
    },
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorItem {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: String,
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: i32,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
}

impl From<(Doctor, User)> for DoctorItem {
    fn from((doctor, user): (Doctor, User)) -> Self {
        Self {
            id: doctor.id,
            user_id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            specialty: doctor.specialty,
            department: doctor.department,
            qualification: doctor.qualification,
            experience_years: doctor.experience_years,
            bio: doctor.bio,
            image_url: doctor.image_url,
            is_available: doctor.is_available,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: i32,
    pub day_of_week: i32,
    pub day_name: &'static str,
    pub start_time: String,
    pub end_time: String,
    pub max_patients: i32,
}

impl From<Schedule> for ScheduleItem {
    fn from(data: Schedule) -> Self {
        Self {
            id: data.id,
            day_of_week: data.day_of_week,
            day_name: DAY_NAMES
                .get(data.day_of_week as usize)
                .copied()
                .unwrap_or(""),
            start_time: crate::utils::format_time(&data.start_time),
            end_time: crate::utils::format_time(&data.end_time),
            max_patients: data.max_patients,
        }
    }
}

#[derive(Serialize)]
pub struct SearchDoctorResponse {
    pub doctors: Vec<DoctorItem>,
}

#[derive(Serialize)]
pub struct SpecialtiesResponse {
    pub specialties: Vec<String>,
}

#[derive(Serialize)]
pub struct DoctorResponse {
    pub doctor: DoctorItem,
}

#[derive(Serialize)]
pub struct DoctorDetailResponse {
    pub doctor: DoctorItem,
    pub schedules: Vec<ScheduleItem>,
}

#[derive(Serialize)]
pub struct SchedulesResponse {
    pub schedules: Vec<ScheduleItem>,
}

#[derive(Serialize)]
pub struct SlotItem {
    pub time: String,
    pub available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    pub doctor_id: i32,
    pub date: String,
    pub day_of_week: i32,
    pub day_name: &'static str,
    pub available: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub max_patients: Option<i32>,
    pub booked: usize,
    pub slots: Vec<SlotItem>,
}

#[derive(Serialize)]
pub struct DoctorAppointmentsResponse {
    pub appointments: Vec<AppointmentItem>,
}
