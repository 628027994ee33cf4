/// Declares a closed set of lowercase string values stored in a `Text` column.
macro_rules! string_enum {
    ( $name:ident, $what:literal { $( $variant:ident => $value:literal ),+ $(,)? } ) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $value ),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $value => Ok($name::$variant), )+
                    _ => Err(crate::error::ApiError::BadRequest(format!(
                        "Invalid {}: {}",
                        $what, s
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod appointments;
pub mod chat_messages;
pub mod doctor_schedules;
pub mod doctors;
pub mod job_applications;
pub mod jobs;
pub mod news;
pub mod sch_stories;
pub mod services;
pub mod users;
