use crate::model::{MarkEntry, SyllabusTopic};
use std::cmp::Ordering;
use std::collections::HashSet;

pub const STAR_PERFORMER_COUNT: usize = 3;

/// Completion percentage for one class, rounded half up. Zero when the class has no topics.
pub fn syllabus_progress(topics: &[SyllabusTopic], class: &str) -> u8 {
    let (total, completed) = topics
        .iter()
        .filter(|t| t.target_class == class)
        .fold((0u64, 0u64), |(total, done), t| {
            (total + 1, done + u64::from(t.completed))
        });
    if total == 0 {
        return 0;
    }
    // round(100 * completed / total) in integers: (200c + t) / 2t
    ((200 * completed + total) / (2 * total)) as u8
}

/// marks / total. A zero or negative total scores as 0 rather than NaN or infinity.
pub fn mark_ratio(marks: f64, total: f64) -> f64 {
    if total > 0.0 {
        marks / total
    } else {
        0.0
    }
}

/// Student ids of the top performers by ratio, best first.
/// Ties keep submission order; repeat entries for a student after the first are ignored.
pub fn star_performers<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a MarkEntry>,
{
    let mut seen = HashSet::new();
    let mut ranked: Vec<(&str, f64)> = entries
        .into_iter()
        .map(|e| (e.student_id.as_str(), mark_ratio(e.marks, e.total)))
        .filter(|(id, _)| seen.insert(*id))
        .collect();
    // sort_by is stable, so equal ratios stay in input order.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
        .into_iter()
        .take(STAR_PERFORMER_COUNT)
        .map(|(id, _)| id.to_string())
        .collect()
}
