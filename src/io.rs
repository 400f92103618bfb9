pub mod simple;

use super::{Course, CourseSlot};
use std::fmt::Write;

/// Format the calculated course schedule into a human readable String (e.g. to print it to
/// stdout). Course names from the catalog are shown next to the identifiers.
///
/// The output format will look like
/// ```text
/// ===== MATH101 (Linear Algebra) =====
/// slot  3  Lecture
/// slot  7  Workshop
/// slot  8  Workshop
///
/// ===== INFO202 =====
/// ...
/// ```
pub fn format_course_schedule(schedule: &[CourseSlot], courses: &[Course]) -> String {
    let mut result = String::new();
    let mut current: Option<&str> = None;
    for record in schedule.iter() {
        if current != Some(record.course.as_str()) {
            let name = courses
                .iter()
                .find(|c| c.id == record.course)
                .map(|c| c.name.as_str())
                .unwrap_or("");
            if name.is_empty() {
                write!(result, "\n===== {} =====\n", record.course).unwrap();
            } else {
                write!(result, "\n===== {} ({}) =====\n", record.course, name).unwrap();
            }
            current = Some(record.course.as_str());
        }
        write!(result, "slot {:2}  {}\n", record.slot, record.session.label()).unwrap();
    }
    result
}
