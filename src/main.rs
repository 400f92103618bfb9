use clap::{arg, command, value_parser};
use log::{error, info, warn};
use std::process::exit;

use timetabler::solver::GoodLpSolver;
use timetabler::timetable::{self, Outcome};

fn main() {
    env_logger::init();

    let args = command!()
        .about("Weekly university timetabling through an external MILP solver")
        .arg(arg!(<INPUT> "JSON file with the course catalog and student roster"))
        .arg(
            arg!(--slots <N> "Number of weekly time slots")
                .value_parser(value_parser!(usize))
                .default_value("45"),
        )
        .arg(
            arg!(--"day-length" <N> "Slots per day; keeps workshop blocks within one day")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--"course-schedule" <FILE> "Output file for the course schedule")
                .default_value("course_schedule.json"),
        )
        .arg(
            arg!(--"student-schedule" <FILE> "Output file for the student schedule")
                .default_value("student_schedule.json"),
        )
        .arg(
            arg!(--"conflict-report" <FILE> "Output file for the conflict report of an infeasible model")
                .default_value("conflict_report.json"),
        )
        .get_matches();

    let input_path = args.get_one::<String>("INPUT").unwrap();
    let file = match std::fs::File::open(input_path) {
        Ok(file) => file,
        Err(e) => {
            error!("Could not open {}: {}", input_path, e);
            exit(exitcode::NOINPUT);
        }
    };
    let (courses, students) = match timetabler::io::simple::read(file) {
        Ok(data) => data,
        Err(e) => {
            error!("Could not read {}: {}", input_path, e);
            exit(exitcode::DATAERR);
        }
    };
    info!(
        "Read {} courses and {} students",
        courses.len(),
        students.len()
    );

    let day_length = args.get_one::<usize>("day-length").copied();
    if day_length == Some(0) {
        error!("--day-length must be at least 1");
        exit(exitcode::DATAERR);
    }
    let options = timetable::Options {
        num_slots: *args.get_one::<usize>("slots").unwrap(),
        day_length,
    };

    match timetable::solve(&courses, &students, &options, &GoodLpSolver) {
        Ok(Outcome::Optimal {
            objective,
            course_schedule,
            student_schedule,
        }) => {
            info!("Optimal timetable found, total attendance {}", objective);
            print!(
                "{}",
                timetabler::io::format_course_schedule(&course_schedule, &courses)
            );
            write_output(args.get_one::<String>("course-schedule").unwrap(), |file| {
                timetabler::io::simple::write_course_schedule(file, &course_schedule)
            });
            write_output(args.get_one::<String>("student-schedule").unwrap(), |file| {
                timetabler::io::simple::write_student_schedule(file, &student_schedule)
            });
        }
        Ok(Outcome::Infeasible(report)) => {
            let path = args.get_one::<String>("conflict-report").unwrap();
            warn!(
                "Model is infeasible; writing {} conflicting constraints to {}",
                report.constraints.len(),
                path
            );
            write_output(path, |file| {
                timetabler::io::simple::write_conflict_report(file, &report)
            });
            exit(exitcode::TEMPFAIL);
        }
        Err(message) => {
            error!("Solving failed: {}", message);
            exit(exitcode::SOFTWARE);
        }
    }
}

/// Create the file at `path` and fill it with the given writer function, exiting on failure
fn write_output<F>(path: &str, write_fn: F)
where
    F: FnOnce(std::fs::File) -> Result<(), String>,
{
    let result = std::fs::File::create(path)
        .map_err(|e| e.to_string())
        .and_then(write_fn);
    if let Err(e) = result {
        error!("Could not write {}: {}", path, e);
        exit(exitcode::CANTCREAT);
    }
}
