pub mod io;
pub mod milp;
pub mod solver;
pub mod timetable;

use serde::{Deserialize, Serialize};

/// One of the three weekly session kinds a course can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Lecture,
    #[serde(rename = "Workshop")]
    NormalWorkshop,
    #[serde(rename = "Computer Workshop")]
    ComputerWorkshop,
}

impl SessionType {
    /// All session types in their canonical order
    pub const ALL: [SessionType; 3] = [
        SessionType::Lecture,
        SessionType::NormalWorkshop,
        SessionType::ComputerWorkshop,
    ];

    pub fn index(self) -> usize {
        match self {
            SessionType::Lecture => 0,
            SessionType::NormalWorkshop => 1,
            SessionType::ComputerWorkshop => 2,
        }
    }

    /// Human readable label, as used in the output records
    pub fn label(self) -> &'static str {
        match self {
            SessionType::Lecture => "Lecture",
            SessionType::NormalWorkshop => "Workshop",
            SessionType::ComputerWorkshop => "Computer Workshop",
        }
    }

    pub fn is_workshop(self) -> bool {
        !matches!(self, SessionType::Lecture)
    }
}

/// Representation of a course's data from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// index of the Course in the list of courses
    #[serde(skip)]
    pub index: usize,
    /// Course's identifier in the catalog. Used in the output records
    pub id: String,
    /// Course's name. Shown in the human readable schedule output
    #[serde(default)]
    pub name: String,
    /// Required weekly lecture slots (0 = the course has no lecture)
    #[serde(default)]
    pub lecture_duration: u32,
    /// Required weekly normal workshop slots (0 = no normal workshop)
    #[serde(default)]
    pub workshop_duration: u32,
    /// Required weekly computer workshop slots (0 = no computer workshop)
    #[serde(default)]
    pub computer_workshop_duration: u32,
}

impl Course {
    /// Required weekly slots of the given session type
    pub fn duration(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Lecture => self.lecture_duration,
            SessionType::NormalWorkshop => self.workshop_duration,
            SessionType::ComputerWorkshop => self.computer_workshop_duration,
        }
    }
}

/// Representation of a student's data from the roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// index of the Student in the list of students
    #[serde(skip)]
    pub index: usize,
    /// Student's identifier in the roster. Used in the output records
    pub id: String,
    /// Indexes of the courses this student may be scheduled into. An empty
    /// list in the input file is expanded to the full catalog by
    /// `io::simple::read`.
    #[serde(default)]
    pub interests: Vec<usize>,
}

/// One placed course session: the course occupies `slot` with a session of
/// the given type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSlot {
    pub course: String,
    pub slot: usize,
    pub session: SessionType,
}

/// One scheduled attendance: the student sits in the course's session at
/// `slot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSlot {
    pub student: String,
    pub course: String,
    pub slot: usize,
    pub session: SessionType,
}

/// A minimal set of mutually contradictory constraints, identified by their
/// labels. Produced when the model turns out infeasible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    pub constraints: Vec<String>,
}

/// Helper function for tests: Assert that the given catalog data is
/// consistent (indexes match positions, student interests reference existing
/// courses).
#[cfg(test)]
pub fn assert_catalog_consistency(courses: &[Course], students: &[Student]) {
    for (i, c) in courses.iter().enumerate() {
        assert_eq!(c.index, i, "Course {} has index {}", i, c.index);
    }
    for (i, s) in students.iter().enumerate() {
        assert_eq!(s.index, i, "Student {} has index {}", i, s.index);
        for interest in s.interests.iter() {
            assert!(
                *interest < courses.len(),
                "Student {} is interested in unknown course {}",
                s.id,
                interest
            );
        }
    }
}
