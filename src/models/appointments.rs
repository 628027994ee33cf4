use crate::schema::appointments;
use diesel::prelude::*;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Queryable, Clone)]
pub struct Appointment {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub patient_id: i32,
    pub doctor_id: i32,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = appointments)]
pub struct UpdateAppointment {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

string_enum!(AppointmentStatus, "appointment status" {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl AppointmentStatus {
    /// Whether the patient may still cancel an appointment in this state.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::AppointmentStatus;

    #[test]
    fn only_open_appointments_are_cancellable() {
        let cancellable: Vec<_> = AppointmentStatus::ALL
            .iter()
            .filter(|s| s.is_cancellable())
            .collect();
        assert_eq!(
            cancellable,
            vec![&AppointmentStatus::Pending, &AppointmentStatus::Approved]
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("done".parse::<AppointmentStatus>().is_err());
        assert!("canceled".parse::<AppointmentStatus>().is_err());
        assert_eq!(
            "cancelled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Cancelled
        );
    }
}
