use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use uuid::Uuid;

use crate::error::ApiError;

/// Generates actix handlers around `<name>_impl` functions.
///
/// Each entry is `(method, name, path, Status, (arg: Type, ...))`; the generated
/// handler forwards its extractors to `<name>_impl` and serializes the returned
/// value as JSON with the given status.
#[macro_export]
macro_rules! api_funcs {
    ( $( ( $method:ident, $func_name:ident, $url:literal, $status:ident, ( $( $arg:ident : $ty:ty ),* $(,)? ) ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[$method($url)]
                async fn $func_name(
                    $( $arg: $ty ),*
                ) -> Result<actix_web::HttpResponse, $crate::error::ApiError> {
                    let response = [<$func_name _impl>]( $( $arg ),* ).await?;
                    Ok(actix_web::HttpResponse::$status().json(response))
                }
            }
        )+
    };
}

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M";
const TIME_FMT_SECS: &str = "%H:%M:%S";

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// The hospital's wall clock, taken from the host's local time zone.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn today() -> NaiveDate {
    local_now().date()
}

pub fn parse_date<S: AsRef<str>>(s: S) -> Result<NaiveDate, ApiError> {
    let s = s.as_ref().trim();
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
}

pub fn parse_date_opt(s: Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    s.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()
}

pub fn parse_time<S: AsRef<str>>(s: S) -> Result<NaiveTime, ApiError> {
    let s = s.as_ref().trim();
    NaiveTime::parse_from_str(s, TIME_FMT)
        .or_else(|_| NaiveTime::parse_from_str(s, TIME_FMT_SECS))
        .map_err(|_| ApiError::BadRequest(format!("Invalid time '{}', expected HH:MM", s)))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

pub fn format_time(time: &NaiveTime) -> String {
    time.format(TIME_FMT).to_string()
}

pub fn format_time_str(time: &NaiveDateTime) -> String {
    const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    format!("{}Z", time.format(DATETIME_FMT))
}

pub fn format_time_str_opt(time: &Option<NaiveDateTime>) -> Option<String> {
    time.as_ref().map(format_time_str)
}

/// Escape character for patterns built by [`get_str_pattern`]; pair every
/// `.like(pattern)` with `.escape(LIKE_ESCAPE)`.
pub const LIKE_ESCAPE: char = '\\';

/// Substring `LIKE` pattern with `%`, `_` and the escape character taken literally.
pub fn get_str_pattern<S: AsRef<str>>(s: S) -> String {
    let mut pattern = String::from("%");
    for c in s.as_ref().trim().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn get_str_pattern_opt<S: AsRef<str>>(s: Option<S>) -> String {
    match s {
        Some(s) if !s.as_ref().trim().is_empty() => get_str_pattern(s),
        _ => "%".to_string(),
    }
}

/// Trims a required text field, rejecting blank input.
pub fn required<S: AsRef<str>>(value: S, field: &str) -> Result<String, ApiError> {
    let value = value.as_ref().trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Trims an optional text field; blank input becomes `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn assert_email(email: &str) -> Result<(), ApiError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }
    Ok(())
}

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn assert_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Lowercase ASCII words joined by `-`. Titles without any usable character
/// fall back to `item`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("item");
    }
    slug
}

/// Slugs that collide with fixed routes next to `/{slug}`.
const RESERVED_SLUGS: &[&str] = &["all"];

/// First of `base`, `base-2`, `base-3`, ... that is not reserved and for which
/// `taken` returns false.
pub fn unique_slug<F>(base: &str, mut taken: F) -> diesel::QueryResult<String>
where
    F: FnMut(&str) -> diesel::QueryResult<bool>,
{
    let mut slug = base.to_string();
    let mut n = 2;
    while RESERVED_SLUGS.contains(&slug.as_str()) || taken(&slug)? {
        slug = format!("{}-{}", base, n);
        n += 1;
    }
    Ok(slug)
}

pub const EXCERPT_LEN: usize = 160;

pub fn make_excerpt(content: &str) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= EXCERPT_LEN {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(EXCERPT_LEN).collect();
    format!("{}...", cut.trim_end())
}

/// Random v4 UUID as 32 hex characters, used for file names, chat sessions
/// and token ids.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
