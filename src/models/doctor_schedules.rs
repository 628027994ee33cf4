use crate::schema::doctor_schedules;
use diesel::prelude::*;
use chrono::NaiveTime;

#[derive(Queryable, Clone)]
pub struct Schedule {
    pub id: i32,
    pub doctor_id: i32,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: i32,
}

#[derive(Insertable)]
#[diesel(table_name = doctor_schedules)]
pub struct NewSchedule {
    pub doctor_id: i32,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub max_patients: i32,
}

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
