//! Chat replies, formatted as Telegram legacy Markdown.

use seatwatch_common::{ParseTargetError, SeatStatus, SectionTarget, WatchKey};

use crate::engine::{Notification, WatchEntry};
use crate::source::{CatalogResolver, QueryError};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Codes shown as examples in welcome and help texts
const POPULAR_PROGRAMS: &[(&str, &str)] = &[
    ("END", "Industrial Engineering (English)"),
    ("TUR", "Turkish Language"),
    ("MAT", "Mathematics"),
    ("FIZ", "Physics"),
    ("KIM", "Chemistry"),
    ("BIL", "Computer Engineering"),
    ("ELE", "Electrical & Electronics"),
    ("MAK", "Mechanical Engineering"),
    ("BHB", "Biomedical Engineering"),
];

fn popular_codes(catalog: &dyn CatalogResolver) -> String {
    POPULAR_PROGRAMS
        .iter()
        .filter(|(code, _)| catalog.resolve(code).is_some())
        .map(|(code, _)| format!("`{}`", code))
        .collect::<Vec<_>>()
        .join(", ")
}

/// First `n` three-letter program codes
fn sample_codes(catalog: &dyn CatalogResolver, n: usize) -> String {
    catalog
        .program_codes()
        .into_iter()
        .filter(|code| code.len() == 3)
        .take(n)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn welcome(first_name: &str, catalog: &dyn CatalogResolver) -> String {
    format!(
        "🎓 *Course Seat Watch*\n\n\
         👋 Hello {first_name}!\n\n\
         ⏳ *How it works*\n\
         • No free seat: the section is watched and checked every minute\n\
         • A seat opens: you get one message with the details\n\n\
         📝 *Format:* `PROGRAM_CRN`, e.g. `END_12345`\n\n\
         🔍 *Popular codes:* {}\n\n\
         {RULE}\n\
         Commands: /status, /cancel, /stop, /help",
        popular_codes(catalog)
    )
}

pub fn help(catalog: &dyn CatalogResolver) -> String {
    let popular = POPULAR_PROGRAMS
        .iter()
        .map(|(code, name)| format!("• `{}` - {}", code, name))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🆘 *Help*\n\n\
         📖 *Usage:* send `PROGRAM_CRN`, e.g. `END_12345`\n\
         • Seats open now: you get the section details\n\
         • Section full: it is checked every minute until a seat opens\n\n\
         📋 *Popular program codes:*\n{popular}\n\n\
         🔍 *Other codes:* `{}...`\n\
         📊 *Programs known:* {}\n\n\
         {RULE}\n\
         /status - list watched sections\n\
         /cancel - stop all watches\n\
         /cancel `PROGRAM_CRN` - stop one watch\n\
         /stop - stop all watches",
        sample_codes(catalog, 15),
        catalog.program_codes().len()
    )
}

pub fn invalid_format(input: &str, reason: Option<&ParseTargetError>) -> String {
    let reason = reason
        .map(|r| format!("❌ {}\n\n", r))
        .unwrap_or_default();
    format!(
        "⚠️ *Invalid format*\n\n\
         You sent: `{input}`\n\
         {reason}\
         ✅ *Expected:* `PROGRAM_CRN` (3 letters, underscore, digits)\n\
         📋 *Examples:* `END_12345`, `TUR_67890`, `BHB_15079`\n\n\
         ❓ /help"
    )
}

pub fn program_not_found(program: &str, catalog: &dyn CatalogResolver) -> String {
    format!(
        "❌ *Program code '{program}' not found*\n\n\
         🔍 *Known codes:* `{}...`\n\
         📋 *Popular:* {}\n\n\
         ❓ /help",
        sample_codes(catalog, 10),
        popular_codes(catalog)
    )
}

pub fn section_not_found(target: &SectionTarget) -> String {
    format!(
        "❌ *CRN '{}' not found*\n\n\
         🔍 Program `{}` has no section with this CRN this term.\n\
         🔄 Check the CRN and try again.",
        target.section, target.program
    )
}

fn section_details(target: &SectionTarget, status: &SeatStatus) -> String {
    format!(
        "📘 *Course:* `{}`\n\
         📖 *Name:* {}\n\
         🔗 *Program:* `{}`\n\
         🆔 *CRN:* `{}`\n\
         🕒 *Time:* {} {}\n\
         {RULE}\n\
         👥 *Capacity:* {}\n\
         📝 *Enrolled:* {}\n\
         🟢 *Open seats:* {}",
        status.course_code,
        status.course_name,
        target.program,
        target.section,
        status.day,
        status.time_slot,
        status.capacity,
        status.enrolled,
        status.open_seats()
    )
}

pub fn available(target: &SectionTarget, status: &SeatStatus, registration_url: &str) -> String {
    format!(
        "🟢 *Seats available!*\n{RULE}\n{}\n{RULE}\n🔗 *Registration:*\n{registration_url}",
        section_details(target, status)
    )
}

/// Completion message of a watch
pub fn seat_opened(notification: &Notification, registration_url: &str) -> String {
    format!(
        "🟢 *SEAT OPENED!*\n{RULE}\n{}\n{RULE}\n🔗 *Registration:*\n{registration_url}\n\n\
         📱 Register quickly! This watch has ended.",
        section_details(&notification.key.target, &notification.status)
    )
}

pub fn watch_started(target: &SectionTarget, status: &SeatStatus) -> String {
    format!(
        "🔴 *No free seats*\n\
         📘 *Course:* `{}`\n\
         🆔 *CRN:* `{}`\n\
         👥 {}/{} enrolled\n\
         ⏳ You will be notified when a seat opens.",
        status.course_code, target.section, status.enrolled, status.capacity
    )
}

pub fn already_watched(target: &SectionTarget, status: &SeatStatus) -> String {
    format!(
        "⏳ *Already watching* `{target}`\n\
         👥 Still {}/{} enrolled, checked every minute.",
        status.enrolled, status.capacity
    )
}

pub fn upstream_error(error: &QueryError) -> String {
    match error {
        QueryError::Timeout => {
            "⏰ *Timed out*\n\nThe schedule server is slow, please try again.".to_string()
        }
        QueryError::ConnectionFailure(_) => {
            "🌐 *Connection error*\n\nCould not reach the schedule server, please try again.".to_string()
        }
        QueryError::UpstreamStatus(code) => {
            format!("❌ *Schedule server error* (HTTP {code})\n\n🔄 Please try again later.")
        }
        QueryError::ParseFailure(_) => {
            "❌ *Course list could not be read*\n\n🔄 Please try again.".to_string()
        }
    }
}

pub fn internal_error() -> String {
    "💥 *Something went wrong*\n\n🔄 Please try again.".to_string()
}

pub fn no_watches() -> String {
    "ℹ️ *No watched sections*\n\nSend `PROGRAM_CRN` to start one, e.g. `END_12345`".to_string()
}

pub fn status_list(entries: &[WatchEntry]) -> String {
    let lines = entries
        .iter()
        .map(|e| format!("`{}` (since {} UTC)", e.key.target, e.created_at.format("%d.%m %H:%M")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "📊 *Watched sections*\n\n\
         📋 *Total:* {}\n\
         ⏳ Checked every minute\n\n\
         {lines}\n\n\
         ❌ /cancel to stop",
        entries.len()
    )
}

fn key_list(keys: &[WatchKey]) -> String {
    keys.iter()
        .map(|k| format!("`{}`", k.target))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn cancelled(keys: &[WatchKey]) -> String {
    if keys.is_empty() {
        return no_watches();
    }
    format!(
        "❌ *Watches cancelled*\n\n📋 {}\n\n🔄 Send `PROGRAM_CRN` to start a new one.",
        key_list(keys)
    )
}

pub fn cancelled_one(target: &SectionTarget, existed: bool) -> String {
    if existed {
        format!("❌ *Stopped watching* `{target}`")
    } else {
        format!("ℹ️ `{target}` is not being watched.\n\n/status lists your watches.")
    }
}

pub fn stopped(first_name: &str, keys: &[WatchKey]) -> String {
    let cancelled = if keys.is_empty() {
        "No active watches.".to_string()
    } else {
        format!("Cancelled: {}", key_list(keys))
    };
    format!("🛑 *Stopped*\n\n👤 {first_name}\n⏹️ {cancelled}\n\n🔄 /start to begin again")
}
