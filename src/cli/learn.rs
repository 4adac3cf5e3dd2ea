use std::io::Write;

use clap::{Args, Subcommand};
use lectern::{
    context::Storefront,
    enrollments::EnrollOutcome,
    ids::{CourseId, LectureId},
};
use tabled::builder::Builder;

use super::{render, write_err};

#[derive(Debug, Args)]
pub(crate) struct LearnCommand {
    #[command(subcommand)]
    command: LearnSubcommand,
}

#[derive(Debug, Subcommand)]
enum LearnSubcommand {
    /// Enroll in a catalog course without going through the cart
    Enroll {
        /// Course id
        id: String,
    },

    /// Mark a lecture completed
    Complete {
        /// Course id
        course: String,

        /// Lecture id
        lecture: String,
    },

    /// Drop a course and its progress
    Unenroll {
        /// Course id
        id: String,
    },

    /// Show progress through one course
    Show {
        /// Course id
        id: String,
    },

    /// Summary of every enrolled course
    Dashboard,
}

pub(crate) fn run(
    command: LearnCommand,
    storefront: &mut Storefront,
    out: &mut impl Write,
) -> Result<(), String> {
    let written = match command.command {
        LearnSubcommand::Enroll { id } => {
            let id = CourseId::from(id);

            let outcome = storefront
                .enroll(&id)
                .map_err(|error| format!("failed to enroll in {id}: {error}"))?;

            match outcome {
                EnrollOutcome::Created => writeln!(out, "enrolled in {id}"),
                EnrollOutcome::AlreadyEnrolled => writeln!(out, "already enrolled in {id}"),
            }
        }
        LearnSubcommand::Complete { course, lecture } => {
            let course = CourseId::from(course);
            let lecture = LectureId::from(lecture);

            let progress = storefront
                .complete_lecture(&course, &lecture)
                .map_err(|error| format!("failed to complete {lecture}: {error}"))?;

            match progress {
                Some(progress) => writeln!(out, "{course} is {progress}% complete"),
                None => writeln!(out, "not enrolled in {course}"),
            }
        }
        LearnSubcommand::Unenroll { id } => {
            let id = CourseId::from(id);

            let removed = storefront
                .unenroll(&id)
                .map_err(|error| format!("failed to unenroll from {id}: {error}"))?;

            match removed {
                Some(enrolled) => writeln!(
                    out,
                    "unenrolled from {id}, discarding {}% progress",
                    enrolled.progress
                ),
                None => writeln!(out, "not enrolled in {id}"),
            }
        }
        LearnSubcommand::Show { id } => return show(&CourseId::from(id), storefront, out),
        LearnSubcommand::Dashboard => return dashboard(storefront, out),
    };

    written.map_err(|error| write_err(&error))
}

fn show(id: &CourseId, storefront: &Storefront, out: &mut impl Write) -> Result<(), String> {
    let Some(enrolled) = storefront.enrollment(id) else {
        return Err(format!("not enrolled in {id}"));
    };

    let mut builder = Builder::default();

    builder.push_record(["", "Lecture", "Title", "Duration"]);

    for lecture in &enrolled.course.lectures {
        let mark = if enrolled.has_completed(&lecture.id) { "✓" } else { "" };

        builder.push_record([
            mark.to_string(),
            lecture.id.to_string(),
            lecture.title.clone(),
            lecture.duration.clone(),
        ]);
    }

    writeln!(
        out,
        "{}\n{}% complete, last accessed {}\n\n{}",
        enrolled.course.title,
        enrolled.progress,
        enrolled.last_accessed.strftime("%Y-%m-%d %H:%M"),
        render(builder),
    )
    .map_err(|error| write_err(&error))
}

fn dashboard(storefront: &Storefront, out: &mut impl Write) -> Result<(), String> {
    let stats = storefront.stats();

    writeln!(
        out,
        " Enrolled:     {}\n Completed:    {}\n Certificates: {}\n Hours:        {}",
        stats.enrolled, stats.completed, stats.certificates, stats.learning_hours,
    )
    .map_err(|error| write_err(&error))?;

    if storefront.enrollments().is_empty() {
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Id", "Title", "Progress", "Lectures", "Enrolled"]);

    for enrolled in storefront.enrollments() {
        builder.push_record([
            enrolled.id().to_string(),
            enrolled.course.title.clone(),
            format!("{}%", enrolled.progress),
            format!(
                "{}/{}",
                enrolled.completed_lectures.len(),
                enrolled.course.lectures.len()
            ),
            enrolled.enrolled_at.strftime("%Y-%m-%d").to_string(),
        ]);
    }

    writeln!(out, "\n{}", render(builder)).map_err(|error| write_err(&error))
}
