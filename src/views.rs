use crate::config::ReferenceData;
use crate::model::{Student, StudentStatus};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const ALL_CLASSES: &str = "All";

pub fn month_id(year: i32, month: u32) -> String {
    format!("{}-{}", year, month)
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn active_students(students: &[Student]) -> Vec<&Student> {
    students.iter().filter(|s| s.is_active()).collect()
}

pub fn archived_students(students: &[Student]) -> Vec<&Student> {
    students
        .iter()
        .filter(|s| s.status == StudentStatus::Deactivated)
        .collect()
}

/// Active students matching `query` against name (case-insensitive) or student phone,
/// restricted to `class_filter` unless it is empty or "All".
pub fn directory<'a>(students: &'a [Student], query: &str, class_filter: Option<&str>) -> Vec<&'a Student> {
    let needle = query.to_lowercase();
    let class_filter = class_filter.filter(|c| !c.is_empty() && *c != ALL_CLASSES);
    students
        .iter()
        .filter(|s| s.is_active())
        .filter(|s| s.name.to_lowercase().contains(&needle) || s.student_phone.contains(query))
        .filter(|s| class_filter.map_or(true, |c| s.student_class == c))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStudent {
    pub id: String,
    pub name: String,
    pub student_class: String,
    pub monthly_fee: f64,
    pub guardian_phone: String,
}

impl From<&Student> for ReminderStudent {
    fn from(s: &Student) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            student_class: s.student_class.clone(),
            monthly_fee: s.monthly_fee,
            guardian_phone: s.guardian_phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today: String,
    pub current_month_id: String,
    pub current_month_name: String,
    pub total_active: usize,
    pub archived: usize,
    pub paid_this_month: usize,
    pub present_today: usize,
    pub show_fee_reminders: bool,
    pub unpaid_students: Vec<ReminderStudent>,
    pub reminder_preview: Vec<ReminderStudent>,
    pub reminder_overflow: usize,
}

pub struct DashboardOptions {
    pub reminder_day: u32,
    pub preview_limit: usize,
}

pub fn dashboard(
    students: &[Student],
    reference: &ReferenceData,
    today: NaiveDate,
    opts: &DashboardOptions,
) -> DashboardStats {
    let month_key = month_id(reference.year_or(today.year()), today.month());
    let today_key = iso_date(today);
    let active = active_students(students);

    let paid_this_month = active.iter().filter(|s| s.has_paid(&month_key)).count();
    let present_today = active
        .iter()
        .filter(|s| s.attendance.iter().any(|d| *d == today_key))
        .count();
    let unpaid: Vec<ReminderStudent> = active
        .iter()
        .filter(|s| !s.has_paid(&month_key))
        .map(|s| ReminderStudent::from(*s))
        .collect();
    let show_fee_reminders = today.day() >= opts.reminder_day && !unpaid.is_empty();
    let reminder_preview: Vec<ReminderStudent> =
        unpaid.iter().take(opts.preview_limit).cloned().collect();
    let reminder_overflow = unpaid.len() - reminder_preview.len();

    DashboardStats {
        today: today_key,
        current_month_name: reference
            .months
            .get(today.month0() as usize)
            .cloned()
            .unwrap_or_default(),
        current_month_id: month_key,
        total_active: active.len(),
        archived: students.len() - active.len(),
        paid_this_month,
        present_today,
        show_fee_reminders,
        unpaid_students: unpaid,
        reminder_preview,
        reminder_overflow,
    }
}
