pub mod admin;
pub mod menu;
pub mod trash;

use crate::dialog::{Dialog, Prompt};
use crate::error::CafeError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Shows `message` as a blocking alert and hands it back as a policy error.
pub(crate) fn refuse(dialog: &mut dyn Dialog, title: &str, message: &str) -> CafeError {
    dialog.alert(&Prompt::new(title, message));
    CafeError::policy(message)
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// `C` + last six digits of the millisecond clock + two random digits.
pub(crate) fn customer_id(now: DateTime<Utc>) -> String {
    let tail = now.timestamp_millis().rem_euclid(1_000_000);
    let random = Uuid::new_v4().as_u128() % 100;
    format!("C{tail:06}{random:02}")
}
