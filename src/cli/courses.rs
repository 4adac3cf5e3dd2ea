use std::io::Write;

use clap::{Args, Subcommand};
use lectern::{
    catalog::CourseFilter,
    context::Storefront,
    courses::{Course, CourseDuration, CourseUpdate, Instructor, Level, NewCourse},
    ids::{CourseId, InstructorId},
};
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::builder::Builder;

use super::{render, write_err};

#[derive(Debug, Args)]
pub(crate) struct CoursesCommand {
    #[command(subcommand)]
    command: CoursesSubcommand,
}

#[derive(Debug, Subcommand)]
enum CoursesSubcommand {
    /// List courses, optionally filtered
    List(ListArgs),

    /// Show one course and its lectures
    Show {
        /// Course id
        id: String,
    },

    /// Add a course to the catalog
    Create(CreateArgs),

    /// Change fields of a course
    Update(UpdateArgs),

    /// Remove a course from the catalog
    Delete {
        /// Course id
        id: String,
    },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Exact category
    #[arg(long)]
    category: Option<String>,

    /// Difficulty level
    #[arg(long)]
    level: Option<Level>,

    /// Case-insensitive title or description search
    #[arg(long)]
    search: Option<String>,
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Title
    #[arg(long)]
    title: String,

    /// Description
    #[arg(long, default_value = "")]
    description: String,

    /// Instructor display name
    #[arg(long)]
    instructor: String,

    /// Price
    #[arg(long)]
    price: Decimal,

    /// Pre-discount price
    #[arg(long)]
    original_price: Option<Decimal>,

    /// Category
    #[arg(long, default_value = "")]
    category: String,

    /// Difficulty level
    #[arg(long, default_value = "Beginner")]
    level: Level,

    /// Duration such as "12 hours"
    #[arg(long, default_value = "")]
    duration: String,

    /// Thumbnail URL
    #[arg(long, default_value = "")]
    thumbnail: String,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Course id
    id: String,

    /// Title
    #[arg(long)]
    title: Option<String>,

    /// Description
    #[arg(long)]
    description: Option<String>,

    /// Price
    #[arg(long)]
    price: Option<Decimal>,

    /// Pre-discount price
    #[arg(long, conflicts_with = "clear_original_price")]
    original_price: Option<Decimal>,

    /// Remove the pre-discount price
    #[arg(long)]
    clear_original_price: bool,

    /// Category
    #[arg(long)]
    category: Option<String>,

    /// Difficulty level
    #[arg(long)]
    level: Option<Level>,

    /// Duration
    #[arg(long)]
    duration: Option<String>,
}

pub(crate) fn run(
    command: CoursesCommand,
    storefront: &mut Storefront,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        CoursesSubcommand::List(args) => list(&args, storefront, out),
        CoursesSubcommand::Show { id } => show(&CourseId::from(id), storefront, out),
        CoursesSubcommand::Create(args) => create(args, storefront, out),
        CoursesSubcommand::Update(args) => update(args, storefront, out),
        CoursesSubcommand::Delete { id } => {
            let id = CourseId::from(id);

            let removed = storefront
                .delete_course(&id)
                .map_err(|error| format!("failed to delete course: {error}"))?;

            let written = match removed {
                Some(course) => writeln!(out, "deleted {} ({})", course.id, course.title),
                None => writeln!(out, "no course with id {id}"),
            };

            written.map_err(|error| write_err(&error))
        }
    }
}

fn list(args: &ListArgs, storefront: &Storefront, out: &mut impl Write) -> Result<(), String> {
    let mut filter = CourseFilter::all();

    if let Some(category) = &args.category {
        filter = filter.category(category.as_str());
    }

    if let Some(level) = args.level {
        filter = filter.level(level);
    }

    if let Some(search) = &args.search {
        filter = filter.search(search.as_str());
    }

    let courses = storefront.courses(&filter);

    if courses.is_empty() {
        return writeln!(out, "no courses match").map_err(|error| write_err(&error));
    }

    let mut builder = Builder::default();

    builder.push_record(["Id", "Title", "Category", "Level", "Price", "Rating", "Lectures"]);

    for course in courses {
        builder.push_record([
            course.id.to_string(),
            course.title.clone(),
            course.category.clone(),
            course.level.to_string(),
            price_label(course, storefront.cart().currency()),
            format!("{:.1}", course.rating),
            course.lectures.len().to_string(),
        ]);
    }

    writeln!(out, "{}", render(builder)).map_err(|error| write_err(&error))
}

fn show(id: &CourseId, storefront: &Storefront, out: &mut impl Write) -> Result<(), String> {
    let Some(course) = storefront.course(id) else {
        return Err(format!("no course with id {id}"));
    };

    writeln!(
        out,
        "{}\n{}\n\nInstructor: {}\nLevel: {}\nCategory: {}\nPrice: {}\nDuration: {} hours\nStudents: {}",
        course.title,
        course.description,
        course.instructor.name,
        course.level,
        course.category,
        price_label(course, storefront.cart().currency()),
        course.duration.hours(),
        course.students,
    )
    .map_err(|error| write_err(&error))?;

    if course.lectures.is_empty() {
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Lecture", "Title", "Duration"]);

    for lecture in &course.lectures {
        builder.push_record([
            lecture.id.to_string(),
            lecture.title.clone(),
            lecture.duration.clone(),
        ]);
    }

    writeln!(out, "\n{}", render(builder)).map_err(|error| write_err(&error))
}

fn create(args: CreateArgs, storefront: &mut Storefront, out: &mut impl Write) -> Result<(), String> {
    let course = storefront
        .create_course(NewCourse {
            title: args.title,
            description: args.description,
            instructor: Instructor {
                id: InstructorId::generate(),
                name: args.instructor,
            },
            price: args.price,
            original_price: args.original_price,
            thumbnail: args.thumbnail,
            category: args.category,
            level: args.level,
            duration: CourseDuration::Label(args.duration),
        })
        .map_err(|error| format!("failed to create course: {error}"))?;

    writeln!(out, "created {} ({})", course.id, course.title).map_err(|error| write_err(&error))
}

fn update(args: UpdateArgs, storefront: &mut Storefront, out: &mut impl Write) -> Result<(), String> {
    let id = CourseId::from(args.id);

    let original_price = if args.clear_original_price {
        Some(None)
    } else {
        args.original_price.map(Some)
    };

    let updated = storefront
        .update_course(
            &id,
            CourseUpdate {
                title: args.title,
                description: args.description,
                price: args.price,
                original_price,
                category: args.category,
                level: args.level,
                duration: args.duration.map(CourseDuration::Label),
                ..CourseUpdate::default()
            },
        )
        .map_err(|error| format!("failed to update course: {error}"))?;

    let written = if updated {
        writeln!(out, "updated {id}")
    } else {
        writeln!(out, "no course with id {id}")
    };

    written.map_err(|error| write_err(&error))
}

fn price_label(course: &Course, currency: &'static Currency) -> String {
    let price = Money::from_decimal(course.price, currency);

    match course.original_price {
        Some(original) if original > course.price => {
            format!("{price} (was {})", Money::from_decimal(original, currency))
        }
        _ => price.to_string(),
    }
}
