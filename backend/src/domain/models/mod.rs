//! Domain models. These carry parsed chrono values and typed enums; the
//! `shared` crate holds the string-typed wire versions.

pub mod amenity;
pub mod dues;
pub mod lot;
pub mod reservation;
pub mod resident;
pub mod vehicle;

/// Generate a prefixed identifier such as `resident::3f2a...`
pub fn generate_id(prefix: &str) -> String {
    format!("{}::{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Implements `as_str`/`parse` for a fieldless status enum stored as TEXT
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub fn parse(value: &str) -> anyhow::Result<Self> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(anyhow::anyhow!("Unknown {} value: {}", stringify!($name), other)),
                }
            }
        }
    };
}

pub(crate) use text_enum;
