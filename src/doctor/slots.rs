//! Fixed 30-minute appointment slots inside a doctor's daily schedule window.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use diesel::{prelude::*, SqliteConnection};

use crate::models::{appointments::AppointmentStatus, doctor_schedules::Schedule};

pub const SLOT_MINUTES: i64 = 30;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub time: NaiveTime,
    pub available: bool,
}

/// Sunday = 0 through Saturday = 6.
pub fn day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

/// Start times of every slot that ends no later than `end`.
pub fn slot_times(start: NaiveTime, end: NaiveTime) -> Vec<NaiveTime> {
    let step = Duration::minutes(SLOT_MINUTES);
    let mut times = Vec::new();
    let mut current = start;
    loop {
        let (slot_end, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 || slot_end > end {
            break;
        }
        times.push(current);
        current = slot_end;
    }
    times
}

pub fn generate_slots(start: NaiveTime, end: NaiveTime, booked: &[NaiveTime]) -> Vec<Slot> {
    slot_times(start, end)
        .into_iter()
        .map(|time| Slot {
            time,
            available: !booked.contains(&time),
        })
        .collect()
}

/// Whether a slot starting at `date` `time` has already begun at `now`.
pub fn has_started(date: NaiveDate, time: NaiveTime, now: NaiveDateTime) -> bool {
    NaiveDateTime::new(date, time) <= now
}

/// A doctor's schedule for one date together with the times already taken.
pub struct DayPlan {
    pub date: NaiveDate,
    /// The doctor takes appointments and their account is active.
    pub open: bool,
    pub schedule: Option<Schedule>,
    pub booked: Vec<NaiveTime>,
}

impl DayPlan {
    pub fn is_full(&self) -> bool {
        match &self.schedule {
            Some(schedule) => self.booked.len() as i64 >= schedule.max_patients as i64,
            None => true,
        }
    }

    /// Slots for the day as seen at local time `now`. Slots that have started
    /// are unavailable, and so is every slot of a full day or a closed doctor.
    pub fn slots(&self, now: NaiveDateTime) -> Vec<Slot> {
        let schedule = match &self.schedule {
            Some(schedule) => schedule,
            None => return Vec::new(),
        };
        let mut slots = generate_slots(schedule.start_time, schedule.end_time, &self.booked);
        let closed = !self.open || self.is_full();
        for slot in slots.iter_mut() {
            if closed || has_started(self.date, slot.time, now) {
                slot.available = false;
            }
        }
        slots
    }
}

pub fn load_day_plan(
    conn: &mut SqliteConnection,
    doctor_id: i32,
    date: NaiveDate,
) -> QueryResult<DayPlan> {
    use crate::schema::{appointments, doctor_schedules, doctors, users};

    let open = doctors::table
        .inner_join(users::table)
        .filter(doctors::id.eq(doctor_id))
        .select((doctors::is_available, users::is_active))
        .first::<(bool, bool)>(conn)
        .optional()?
        .is_some_and(|(available, active)| available && active);

    let schedule = doctor_schedules::table
        .filter(doctor_schedules::doctor_id.eq(doctor_id))
        .filter(doctor_schedules::day_of_week.eq(day_of_week(date)))
        .first::<Schedule>(conn)
        .optional()?;

    let booked = appointments::table
        .filter(appointments::doctor_id.eq(doctor_id))
        .filter(appointments::appointment_date.eq(date))
        .filter(appointments::status.ne(AppointmentStatus::Cancelled.as_str()))
        .select(appointments::appointment_time)
        .load::<NaiveTime>(conn)?;

    Ok(DayPlan {
        date,
        open,
        schedule,
        booked,
    })
}
