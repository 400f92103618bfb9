use crate::{ConflictReport, Course, CourseSlot, Student, StudentSlot};
use serde_json::json;

/// Read the course catalog and student roster from the simple JSON representation (canonical
/// serde_json serialization of `Course` and `Student` objects under the keys "courses" and
/// "students").
///
/// A student without an `interests` list is interested in the whole catalog; the list is
/// expanded here, so the core never sees an empty eligibility set. Interests referencing
/// unknown courses are rejected, duplicate entries are merged.
pub fn read<R: std::io::Read>(reader: R) -> Result<(Vec<Course>, Vec<Student>), String> {
    let mut data: serde_json::Value =
        serde_json::from_reader(reader).map_err(|err| err.to_string())?;

    let mut courses: Vec<Course> =
        serde_json::from_value(data["courses"].take()).map_err(|e| format!("{}", e))?;
    for (i, c) in courses.iter_mut().enumerate() {
        c.index = i;
    }
    let mut students: Vec<Student> =
        serde_json::from_value(data["students"].take()).map_err(|e| format!("{}", e))?;
    for (i, s) in students.iter_mut().enumerate() {
        s.index = i;
        if s.interests.is_empty() {
            s.interests = (0..courses.len()).collect();
        }
        for interest in s.interests.iter() {
            if *interest >= courses.len() {
                return Err(format!(
                    "Student {} is interested in unknown course index {}",
                    s.id, interest
                ));
            }
        }
        // A duplicate interest would create duplicate attendance variables
        s.interests.sort_unstable();
        s.interests.dedup();
    }

    Ok((courses, students))
}

/// Write the calculated course schedule as simple JSON representation (canonical serde_json
/// serialization of `CourseSlot` objects) to a Writer (e.g. an output file).
pub fn write_course_schedule<W: std::io::Write>(
    writer: W,
    schedule: &[CourseSlot],
) -> Result<(), String> {
    let s: serde_json::Value = serde_json::to_value(schedule).map_err(|e| format!("{}", e))?;
    let data = json!({
        "format": "X-courseschedule-simple",
        "version": "1.0",
        "schedule": s
    });
    serde_json::to_writer(writer, &data).map_err(|e| format!("{}", e))?;

    Ok(())
}

/// Write the calculated student schedule as simple JSON representation (canonical serde_json
/// serialization of `StudentSlot` objects) to a Writer (e.g. an output file).
pub fn write_student_schedule<W: std::io::Write>(
    writer: W,
    schedule: &[StudentSlot],
) -> Result<(), String> {
    let s: serde_json::Value = serde_json::to_value(schedule).map_err(|e| format!("{}", e))?;
    let data = json!({
        "format": "X-studentschedule-simple",
        "version": "1.0",
        "schedule": s
    });
    serde_json::to_writer(writer, &data).map_err(|e| format!("{}", e))?;

    Ok(())
}

/// Write the conflict report of an infeasible model to a Writer, for human debugging.
pub fn write_conflict_report<W: std::io::Write>(
    writer: W,
    report: &ConflictReport,
) -> Result<(), String> {
    let c: serde_json::Value =
        serde_json::to_value(&report.constraints).map_err(|e| format!("{}", e))?;
    let data = json!({
        "format": "X-conflictreport-simple",
        "version": "1.0",
        "constraints": c
    });
    serde_json::to_writer(writer, &data).map_err(|e| format!("{}", e))?;

    Ok(())
}

#[cfg(test)]
mod test {
    use crate::{ConflictReport, CourseSlot, SessionType, StudentSlot};

    const SIMPLE_INPUT: &str = r#"{
        "courses": [
            {"id": "MATH101", "name": "Linear Algebra", "lecture_duration": 2,
             "workshop_duration": 1},
            {"id": "INFO202", "name": "Programming", "lecture_duration": 1,
             "computer_workshop_duration": 3}
        ],
        "students": [
            {"id": "S1", "name": "Anna"},
            {"id": "S2", "name": "Ben", "interests": [1]}
        ]
    }"#;

    #[test]
    fn parse_simple_file() {
        let (courses, students) = super::read(SIMPLE_INPUT.as_bytes()).unwrap();

        crate::assert_catalog_consistency(&courses, &students);
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].id, "MATH101");
        assert_eq!(courses[0].lecture_duration, 2);
        assert_eq!(courses[0].workshop_duration, 1);
        assert_eq!(courses[0].computer_workshop_duration, 0);
        assert_eq!(courses[1].computer_workshop_duration, 3);
        assert_eq!(students.len(), 2);
        // Anna has no interests entry, so she is interested in the full catalog
        assert_eq!(students[0].interests, vec![0, 1]);
        assert_eq!(students[1].interests, vec![1]);
    }

    #[test]
    fn merge_duplicate_interests() {
        let input = r#"{
            "courses": [
                {"id": "MATH101", "lecture_duration": 1},
                {"id": "INFO202", "lecture_duration": 1}
            ],
            "students": [{"id": "S1", "interests": [1, 1, 0]}]
        }"#;
        let (_, students) = super::read(input.as_bytes()).unwrap();
        assert_eq!(students[0].interests, vec![0, 1]);
    }

    #[test]
    fn reject_unknown_interest() {
        let input = r#"{
            "courses": [{"id": "MATH101", "lecture_duration": 1}],
            "students": [{"id": "S1", "interests": [3]}]
        }"#;
        let result = super::read(input.as_bytes());
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("unknown course index 3"));
    }

    #[test]
    fn write_schedules() {
        let course_schedule = vec![CourseSlot {
            course: String::from("MATH101"),
            slot: 4,
            session: SessionType::NormalWorkshop,
        }];
        let student_schedule = vec![StudentSlot {
            student: String::from("S1"),
            course: String::from("MATH101"),
            slot: 4,
            session: SessionType::NormalWorkshop,
        }];

        let mut buffer = Vec::<u8>::new();
        super::write_course_schedule(&mut buffer, &course_schedule).unwrap();
        let mut data: serde_json::Value = serde_json::from_reader(&buffer[..]).unwrap();
        assert_eq!(data["format"], "X-courseschedule-simple");
        let parsed: Vec<CourseSlot> = serde_json::from_value(data["schedule"].take()).unwrap();
        assert_eq!(parsed, course_schedule);
        assert_eq!(
            serde_json::to_value(&course_schedule[0]).unwrap()["session"],
            "Workshop"
        );

        let mut buffer = Vec::<u8>::new();
        super::write_student_schedule(&mut buffer, &student_schedule).unwrap();
        let mut data: serde_json::Value = serde_json::from_reader(&buffer[..]).unwrap();
        assert_eq!(data["format"], "X-studentschedule-simple");
        let parsed: Vec<StudentSlot> = serde_json::from_value(data["schedule"].take()).unwrap();
        assert_eq!(parsed, student_schedule);
    }

    #[test]
    fn write_conflict_report() {
        let report = ConflictReport {
            constraints: vec![String::from("duration(MATH101, Workshop)")],
        };
        let mut buffer = Vec::<u8>::new();
        super::write_conflict_report(&mut buffer, &report).unwrap();

        let data: serde_json::Value = serde_json::from_reader(&buffer[..]).unwrap();
        assert_eq!(data["format"], "X-conflictreport-simple");
        assert_eq!(data["constraints"][0], "duration(MATH101, Workshop)");
    }
}
