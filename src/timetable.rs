//! The MILP formulation of the weekly timetabling problem.
//!
//! The module provides the variable factory and the constraint generation passes that turn a
//! course catalog and a student roster into a `milp::Model`, as well as the `solve()` function
//! orchestrating one build-solve-extract run against an external `MilpSolver`. All data
//! conversion between Course/Student objects and model variables happens here.
//!
//! Two boolean variable families are created: a placement variable per (course, slot, session
//! type) and an attendance variable per (student, course, slot, session type). Session types
//! with a required duration of 0 get no variables at all, so no phantom sessions can appear in
//! the solution. Attendance variables are only created for the courses in a student's interest
//! set, keeping the model sparse.


use crate::milp::{Comparison, LinExpr, MilpSolver, Model, Sense, SolveStatus, VarId};
use crate::{ConflictReport, Course, CourseSlot, SessionType, Student, StudentSlot};
use itertools::iproduct;
use log::{debug, info};
use ndarray::Array3;

/// Default number of weekly time slots: 9 hours per day on 5 days
pub const DEFAULT_NUM_SLOTS: usize = 45;

/// Model building options. Time slots are numbered 1..=num_slots on one continuous weekly
/// axis. With `day_length` set, workshop blocks are kept within one day of that many slots;
/// without it, a block may legally span a day transition.
#[derive(Debug, Clone)]
pub struct Options {
    pub num_slots: usize,
    pub day_length: Option<usize>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            num_slots: DEFAULT_NUM_SLOTS,
            day_length: None,
        }
    }
}

/// Reported result of one solve run. Infeasibility is not an error: it carries the conflict
/// report for human debugging.
#[derive(Debug)]
pub enum Outcome {
    Optimal {
        objective: f64,
        course_schedule: Vec<CourseSlot>,
        student_schedule: Vec<StudentSlot>,
    },
    Infeasible(ConflictReport),
}

/// Main function of the module: build the timetabling model for the given catalog, run the
/// solver once and extract the schedules.
///
/// Returns `Outcome::Infeasible` with an irreducible infeasible subset of constraint labels if
/// no feasible timetable exists. An unbounded model or an internal solver failure is a fatal
/// error and reported as `Err`.
pub fn solve(
    courses: &[Course],
    students: &[Student],
    options: &Options,
    solver: &impl MilpSolver,
) -> Result<Outcome, String> {
    if options.day_length == Some(0) {
        return Err(String::from("day-length must be at least 1 slot"));
    }

    let mut model = Model::new();
    let vars = create_variables(&mut model, courses, students, options);
    add_duration_constraints(&mut model, &vars, courses, options);
    add_block_constraints(&mut model, &vars, courses, options);
    add_attendance_constraints(&mut model, &vars, courses, students);
    add_clash_constraints(&mut model, &vars, students, options);
    add_single_session_constraints(&mut model, &vars, courses, students, options);
    model.set_objective(
        Sense::Maximize,
        LinExpr::sum(vars.attendance.iter().map(|a| a.var)),
    );
    info!(
        "Built timetabling model with {} variables and {} constraints",
        model.num_vars(),
        model.constraints.len()
    );

    match solver.solve(&model) {
        SolveStatus::Optimal(solution) => {
            let (course_schedule, student_schedule) =
                extract_schedules(&vars, &solution, courses, students);
            Ok(Outcome::Optimal {
                objective: solution.objective,
                course_schedule,
                student_schedule,
            })
        }
        SolveStatus::Infeasible => {
            debug!("Model is infeasible, computing irreducible infeasible subset");
            let conflict = solver.compute_iis(&model);
            Ok(Outcome::Infeasible(ConflictReport {
                constraints: conflict.into_iter().map(|c| c.label).collect(),
            }))
        }
        SolveStatus::Unbounded => Err(String::from("solver reported the model as unbounded")),
        SolveStatus::Error(message) => Err(format!("solver failed: {}", message)),
    }
}

/// One attendance variable with the combination of student, course, slot and session type it
/// stands for. Kept in creation order, so iterating the list yields deterministic output.
struct AttendanceVar {
    student: usize,
    course: usize,
    slot: usize,
    session: SessionType,
    var: VarId,
}

/// The decision variables of one model build
struct DecisionVariables {
    /// Placement variable ids, indexed by (course, slot - 1, session type index). `None` for
    /// session types the course does not offer.
    placement: Array3<Option<VarId>>,
    /// Attendance variables of all students, in creation order
    attendance: Vec<AttendanceVar>,
}

impl DecisionVariables {
    fn placement_var(&self, course: usize, slot: usize, session: SessionType) -> Option<VarId> {
        self.placement[(course, slot - 1, session.index())]
    }
}

/// Create the placement and attendance variable families. Session types with zero required
/// duration are skipped entirely, and attendance variables are restricted to each student's
/// interest set.
fn create_variables(
    model: &mut Model,
    courses: &[Course],
    students: &[Student],
    options: &Options,
) -> DecisionVariables {
    let mut placement = Array3::from_elem(
        (courses.len(), options.num_slots, SessionType::ALL.len()),
        None,
    );
    for (c, course) in courses.iter().enumerate() {
        for session in SessionType::ALL.iter().copied() {
            if course.duration(session) == 0 {
                continue;
            }
            for slot in 1..=options.num_slots {
                placement[(c, slot - 1, session.index())] = Some(model.add_binary());
            }
        }
    }

    let mut attendance = Vec::new();
    for (s, student) in students.iter().enumerate() {
        for c in student.interests.iter().copied() {
            for session in SessionType::ALL.iter().copied() {
                if courses[c].duration(session) == 0 {
                    continue;
                }
                for slot in 1..=options.num_slots {
                    attendance.push(AttendanceVar {
                        student: s,
                        course: c,
                        slot,
                        session,
                        var: model.add_binary(),
                    });
                }
            }
        }
    }

    DecisionVariables {
        placement,
        attendance,
    }
}

/// For each course and session type with required duration d > 0: the number of occupied slots
/// equals d exactly.
fn add_duration_constraints(
    model: &mut Model,
    vars: &DecisionVariables,
    courses: &[Course],
    options: &Options,
) {
    for (c, course) in courses.iter().enumerate() {
        for session in SessionType::ALL.iter().copied() {
            let duration = course.duration(session);
            if duration == 0 {
                continue;
            }
            let expr = LinExpr::sum(
                (1..=options.num_slots).map(|slot| vars.placement_var(c, slot, session).unwrap()),
            );
            model.add_constraint(
                format!("duration({}, {})", course.id, session.label()),
                expr,
                Comparison::Equal,
                duration as f64,
            );
        }
    }
}

/// Workshop sessions must occupy one contiguous run of slots. A run start at slot t (placement
/// on at t, off at t-1) forces the whole d-slot window from t to be on:
///
/// ```text
/// d * (x[t] - x[t-1]) <= x[t] + x[t+1] + ... + x[t+d-1]
/// ```
///
/// Starts without room for a full window (end of the axis, or crossing a day boundary when
/// `day_length` is set) are forbidden with `x[t] - x[t-1] <= 0`. Together with the duration
/// total this pins exactly one contiguous run of length d.
fn add_block_constraints(
    model: &mut Model,
    vars: &DecisionVariables,
    courses: &[Course],
    options: &Options,
) {
    for (c, course) in courses.iter().enumerate() {
        for session in SessionType::ALL.iter().copied().filter(|s| s.is_workshop()) {
            let duration = course.duration(session) as usize;
            if duration == 0 {
                continue;
            }
            for slot in 1..=options.num_slots {
                // rise term x[t] - x[t-1], with x[0] = 0
                let rise = |coefficient: f64| {
                    let mut expr = LinExpr::new()
                        .term(vars.placement_var(c, slot, session).unwrap(), coefficient);
                    if slot > 1 {
                        expr.add_term(
                            vars.placement_var(c, slot - 1, session).unwrap(),
                            -coefficient,
                        );
                    }
                    expr
                };

                let last = slot + duration - 1;
                let same_day = options
                    .day_length
                    .map_or(true, |len| (slot - 1) / len == (last - 1) / len);
                if last <= options.num_slots && same_day {
                    let mut expr = rise(duration as f64);
                    for k in 0..duration {
                        expr.add_term(vars.placement_var(c, slot + k, session).unwrap(), -1.0);
                    }
                    model.add_constraint(
                        format!("block({}, {}, start {})", course.id, session.label(), slot),
                        expr,
                        Comparison::LessEq,
                        0.0,
                    );
                } else {
                    model.add_constraint(
                        format!(
                            "block({}, {}, no start {})",
                            course.id,
                            session.label(),
                            slot
                        ),
                        rise(1.0),
                        Comparison::LessEq,
                        0.0,
                    );
                }
            }
        }
    }
}

/// A student can only attend a session that is actually placed in the slot: y <= x for every
/// attendance variable.
fn add_attendance_constraints(
    model: &mut Model,
    vars: &DecisionVariables,
    courses: &[Course],
    students: &[Student],
) {
    for a in vars.attendance.iter() {
        // Placement variables exist for every created attendance variable, since both are
        // skipped for zero-duration session types.
        let placement = vars.placement_var(a.course, a.slot, a.session).unwrap();
        model.add_constraint(
            format!(
                "attendance({}, {}, {}, slot {})",
                students[a.student].id,
                courses[a.course].id,
                a.session.label(),
                a.slot
            ),
            LinExpr::new().term(a.var, 1.0).term(placement, -1.0),
            Comparison::LessEq,
            0.0,
        );
    }
}

/// No double booking: per student and slot, at most one attendance across all courses and
/// session types.
fn add_clash_constraints(
    model: &mut Model,
    vars: &DecisionVariables,
    students: &[Student],
    options: &Options,
) {
    for (s, slot) in iproduct!(0..students.len(), 1..=options.num_slots) {
        let expr = LinExpr::sum(
            vars.attendance
                .iter()
                .filter(|a| a.student == s && a.slot == slot)
                .map(|a| a.var),
        );
        if expr.terms.is_empty() {
            continue;
        }
        model.add_constraint(
            format!("clash({}, slot {})", students[s].id, slot),
            expr,
            Comparison::LessEq,
            1.0,
        );
    }
}

/// Per student, course and slot, at most one of the three session types is attended. Redundant
/// with the clash constraints, but enforced independently.
fn add_single_session_constraints(
    model: &mut Model,
    vars: &DecisionVariables,
    courses: &[Course],
    students: &[Student],
    options: &Options,
) {
    for (s, student) in students.iter().enumerate() {
        for c in student.interests.iter().copied() {
            for slot in 1..=options.num_slots {
                let expr = LinExpr::sum(
                    vars.attendance
                        .iter()
                        .filter(|a| a.student == s && a.course == c && a.slot == slot)
                        .map(|a| a.var),
                );
                if expr.terms.is_empty() {
                    continue;
                }
                model.add_constraint(
                    format!(
                        "single-session({}, {}, slot {})",
                        student.id, courses[c].id, slot
                    ),
                    expr,
                    Comparison::LessEq,
                    1.0,
                );
            }
        }
    }
}

/// Read the solved variable values back into ordered course and student schedule records.
fn extract_schedules(
    vars: &DecisionVariables,
    solution: &crate::milp::Solution,
    courses: &[Course],
    students: &[Student],
) -> (Vec<CourseSlot>, Vec<StudentSlot>) {
    let num_slots = vars.placement.dim().1;
    let mut course_schedule = Vec::new();
    for (c, course) in courses.iter().enumerate() {
        for session in SessionType::ALL.iter().copied() {
            for slot in 1..=num_slots {
                if let Some(var) = vars.placement_var(c, slot, session) {
                    if solution.is_set(var) {
                        course_schedule.push(CourseSlot {
                            course: course.id.clone(),
                            slot,
                            session,
                        });
                    }
                }
            }
        }
    }

    let mut student_schedule = Vec::new();
    for a in vars.attendance.iter() {
        if solution.is_set(a.var) {
            student_schedule.push(StudentSlot {
                student: students[a.student].id.clone(),
                course: courses[a.course].id.clone(),
                slot: a.slot,
                session: a.session,
            });
        }
    }

    (course_schedule, student_schedule)
}
