//! Outgoing SOS text

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use super::contacts::ContactRegistry;
use super::templates::EmergencyTemplate;
use crate::{HandsUpError, Result};

const FALLBACK_NAME: &str = "Emergency Contact";

/// Short Australian date with a medium time, e.g. "9/3/26, 2:05:09 pm"
fn format_sent_at(sent_at: &DateTime<Tz>) -> String {
    sent_at.format("%-d/%-m/%y, %-I:%M:%S %P").to_string()
}

#[must_use]
pub fn build_sos_message(
    template: &EmergencyTemplate,
    user_name: &str,
    location_text: &str,
    sent_at: &DateTime<Tz>,
    emergency_number: &str,
) -> String {
    let name = if user_name.trim().is_empty() {
        FALLBACK_NAME
    } else {
        user_name.trim()
    };

    format!(
        "🚨 EMERGENCY SOS 🚨\n\
         \n\
         {emoji} {title}\n\
         {body}\n\
         \n\
         Person: {name}\n\
         Location: {location_text}\n\
         Time: {time}\n\
         \n\
         This is an automated emergency message from the HandsUp app.\n\
         Please call emergency services ({emergency_number}) immediately.\n\
         \n\
         If you receive this message, please:\n\
         1. Call {emergency_number} for emergency services\n\
         2. Provide the location coordinates above\n\
         3. Contact the person if possible",
        emoji = template.emoji,
        title = template.title,
        body = template.message,
        time = format_sent_at(sent_at),
    )
}

/// Recipients and body handed to whatever delivers the text messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SosAlert {
    pub recipients: Vec<String>,
    pub body: String,
}

impl SosAlert {
    pub fn prepare(
        contacts: &ContactRegistry,
        template: &EmergencyTemplate,
        user_name: &str,
        location_text: &str,
        sent_at: &DateTime<Tz>,
        emergency_number: &str,
    ) -> Result<Self> {
        let recipients = contacts.phone_numbers();
        if recipients.is_empty() {
            return Err(HandsUpError::validation("No emergency contacts have been added"));
        }
        Ok(Self {
            recipients,
            body: build_sos_message(template, user_name, location_text, sent_at, emergency_number),
        })
    }
}
