table! {
    appointments (id) {
        id -> Integer,
        patient_id -> Integer,
        doctor_id -> Integer,
        appointment_date -> Date,
        appointment_time -> Time,
        reason -> Nullable<Text>,
        notes -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    chat_messages (id) {
        id -> Integer,
        session_id -> Text,
        sender -> Text,
        message -> Text,
        created_at -> Timestamp,
    }
}

table! {
    doctor_schedules (id) {
        id -> Integer,
        doctor_id -> Integer,
        day_of_week -> Integer,
        start_time -> Time,
        end_time -> Time,
        max_patients -> Integer,
    }
}

table! {
    doctors (id) {
        id -> Integer,
        user_id -> Integer,
        specialty -> Text,
        department -> Nullable<Text>,
        qualification -> Nullable<Text>,
        experience_years -> Integer,
        bio -> Nullable<Text>,
        image_url -> Nullable<Text>,
        is_available -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    job_applications (id) {
        id -> Integer,
        job_id -> Integer,
        user_id -> Integer,
        full_name -> Text,
        email -> Text,
        phone -> Nullable<Text>,
        cover_letter -> Nullable<Text>,
        resume_url -> Nullable<Text>,
        status -> Text,
        hr_notes -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    jobs (id) {
        id -> Integer,
        title -> Text,
        department -> Text,
        location -> Text,
        employment_type -> Text,
        description -> Text,
        requirements -> Nullable<Text>,
        salary_range -> Nullable<Text>,
        deadline -> Nullable<Date>,
        is_active -> Bool,
        created_by -> Nullable<Integer>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    news (id) {
        id -> Integer,
        title -> Text,
        slug -> Text,
        excerpt -> Text,
        content -> Text,
        image_url -> Nullable<Text>,
        category -> Text,
        author_id -> Nullable<Integer>,
        is_published -> Bool,
        published_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    sch_stories (id) {
        id -> Integer,
        title -> Text,
        description -> Nullable<Text>,
        video_url -> Nullable<Text>,
        image_url -> Nullable<Text>,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    services (id) {
        id -> Integer,
        name -> Text,
        slug -> Text,
        description -> Text,
        icon -> Nullable<Text>,
        image_url -> Nullable<Text>,
        display_order -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Integer,
        email -> Text,
        password -> Text,
        name -> Text,
        phone -> Nullable<Text>,
        role -> Text,
        session_token -> Nullable<Text>,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

joinable!(appointments -> doctors (doctor_id));
joinable!(appointments -> users (patient_id));
joinable!(doctor_schedules -> doctors (doctor_id));
joinable!(doctors -> users (user_id));
joinable!(job_applications -> jobs (job_id));
joinable!(job_applications -> users (user_id));

allow_tables_to_appear_in_same_query!(
    appointments,
    chat_messages,
    doctor_schedules,
    doctors,
    job_applications,
    jobs,
    news,
    sch_stories,
    services,
    users,
);
