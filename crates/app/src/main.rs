use std::fmt;
use std::sync::Arc;

use course_core::Clock;
use course_core::model::{CourseId, LessonId};
use services::{
    AppServices, CatalogProvider, CertificateError, HttpCatalog, PlayerError, StaticCatalog,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArg { name: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArg { name } => write!(f, "missing required argument: <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => {
                write!(f, "invalid {flag} value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- courses");
    eprintln!("  cargo run -p app -- course <course-id>");
    eprintln!("  cargo run -p app -- enroll <course-id>");
    eprintln!(
        "  cargo run -p app -- watch <course-id> <lesson-id> --position <secs> --duration <secs>"
    );
    eprintln!("  cargo run -p app -- complete <lesson-id>");
    eprintln!("  cargo run -p app -- dashboard");
    eprintln!("  cargo run -p app -- certificate <course-id>");
    eprintln!("  cargo run -p app -- blogs");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --db <sqlite_url>    progress store (default sqlite:skillframe.sqlite3)");
    eprintln!("  --api-url <url>      HTTP catalog; omit to use the built-in sample catalog");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SKILLFRAME_DB_URL, SKILLFRAME_API_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Courses,
    Course,
    Enroll,
    Watch,
    Complete,
    Dashboard,
    Certificate,
    Blogs,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "courses" => Some(Self::Courses),
            "course" => Some(Self::Course),
            "enroll" => Some(Self::Enroll),
            "watch" => Some(Self::Watch),
            "complete" => Some(Self::Complete),
            "dashboard" => Some(Self::Dashboard),
            "certificate" => Some(Self::Certificate),
            "blogs" => Some(Self::Blogs),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    api_url: Option<String>,
    positionals: Vec<String>,
    position: Option<f64>,
    duration: Option<f64>,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_secs(flag: &'static str, raw: String) -> Result<f64, ArgsError> {
    raw.parse::<f64>()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("SKILLFRAME_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://skillframe.sqlite3".into(), normalize_sqlite_url);
        let mut api_url = std::env::var("SKILLFRAME_API_URL").ok();
        let mut positionals = Vec::new();
        let mut position = None;
        let mut duration = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api-url" => {
                    api_url = Some(require_value(args, "--api-url")?);
                }
                "--position" => {
                    position = Some(parse_secs("--position", require_value(args, "--position")?)?);
                }
                "--duration" => {
                    duration = Some(parse_secs("--duration", require_value(args, "--duration")?)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        Ok(Self {
            db_url,
            api_url,
            positionals,
            position,
            duration,
        })
    }

    fn positional(&self, index: usize, name: &'static str) -> Result<&str, ArgsError> {
        self.positionals
            .get(index)
            .map(String::as_str)
            .ok_or(ArgsError::MissingArg { name })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent) / 10;
    format!("[{}{}] {percent:>3}%", "#".repeat(filled), "-".repeat(10 - filled))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    argv.remove(0);

    let mut iter = argv.into_iter();
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog: Arc<dyn CatalogProvider> = match &args.api_url {
        Some(url) => {
            tracing::info!("using HTTP catalog at {url}");
            Arc::new(HttpCatalog::new(url.clone()))
        }
        None => Arc::new(StaticCatalog::sample()),
    };

    // Open + migrate SQLite at startup.
    prepare_sqlite_file(&args.db_url)?;
    let app = AppServices::new_sqlite(&args.db_url, catalog, Clock::default_clock()).await?;

    match cmd {
        Command::Courses => {
            let courses = app.catalog().list_courses().await?;
            let state = app.progress().snapshot();
            for course in &courses {
                let view = course_core::projection::project_course(course, &state);
                let marker = if view.is_enrolled { "*" } else { " " };
                println!(
                    "{marker} {:<14} {:<28} {:<8} {}",
                    course.id(),
                    course.name(),
                    course.category(),
                    progress_bar(view.percent)
                );
            }
            println!();
            println!("* = enrolled");
        }
        Command::Course => {
            let id = CourseId::new(args.positional(0, "course-id")?);
            match app.courses().detail(&id).await? {
                None => println!("course not found: {id}"),
                Some(detail) => {
                    println!("{} ({})", detail.course.name(), detail.course.category());
                    println!("{}", detail.course.description());
                    println!(
                        "{}  {}/{} lessons",
                        progress_bar(detail.progress.percent),
                        detail.progress.completed_count,
                        detail.progress.total_lessons
                    );
                    let progress = app.progress();
                    for (idx, lesson) in detail.course.lessons().iter().enumerate() {
                        let lock = if detail.lessons[idx].locked { "locked" } else { "open" };
                        let done = if progress.is_lesson_completed(lesson.id()) {
                            "done"
                        } else {
                            "    "
                        };
                        println!(
                            "  {:>2}. {:<28} {:<8} {:<6} {done}",
                            idx + 1,
                            lesson.title(),
                            lesson.duration(),
                            lock
                        );
                    }
                }
            }
        }
        Command::Enroll => {
            let id = CourseId::new(args.positional(0, "course-id")?);
            match app.catalog().get_course(&id).await? {
                None => println!("course not found: {id}"),
                Some(course) => {
                    app.courses().enroll(id).await;
                    println!("Enrolled in \"{}\". Let's start learning.", course.name());
                    if let Some(first) = course.first_lesson() {
                        println!("First lesson: {} ({})", first.title(), first.duration());
                    }
                }
            }
        }
        Command::Watch => {
            let course_id = CourseId::new(args.positional(0, "course-id")?);
            let lesson_id = LessonId::new(args.positional(1, "lesson-id")?);
            let position = args.position.ok_or(ArgsError::MissingArg { name: "position" })?;
            let duration = args.duration.ok_or(ArgsError::MissingArg { name: "duration" })?;

            match app.player().start_lesson(&course_id, &lesson_id).await {
                Err(PlayerError::LessonLocked(course)) => {
                    println!("Lessons are locked; enroll in {course} first.");
                }
                Err(err) => return Err(err.into()),
                Ok(ctx) => {
                    println!(
                        "Lesson {}/{}: {}",
                        ctx.number,
                        ctx.total_lessons,
                        ctx.lesson.title()
                    );
                    let completed = app
                        .player()
                        .observe_playback(&course_id, &lesson_id, position, duration)
                        .await?;
                    if completed {
                        println!("Marked as completed.");
                    } else {
                        println!("Keep watching; the lesson completes at 90%.");
                    }
                    if let Some(next) = ctx.next {
                        println!("Up next: {next}");
                    }
                }
            }
        }
        Command::Complete => {
            let lesson_id = LessonId::new(args.positional(0, "lesson-id")?);
            app.progress().mark_lesson_completed(lesson_id.clone()).await;
            println!("Marked {lesson_id} as completed.");
        }
        Command::Dashboard => {
            let view = app.dashboard().dashboard().await?;
            println!(
                "{} lessons done, {} certificates, {} courses enrolled",
                view.stats.total_lessons_completed,
                view.stats.total_certificates,
                view.stats.enrolled_courses
            );
            if !view.stats.category_distribution.is_empty() {
                println!("Interests:");
                for share in &view.stats.category_distribution {
                    println!("  {:<12} {:>3}%", share.category, share.percent);
                }
            }
            println!("Continue learning:");
            for item in &view.in_progress {
                println!(
                    "  {:<28} {}",
                    item.course.name(),
                    progress_bar(item.progress.percent)
                );
            }
            println!("Completed:");
            for item in &view.completed {
                println!("  {:<28} {}", item.course.name(), progress_bar(100));
            }
        }
        Command::Certificate => {
            let id = CourseId::new(args.positional(0, "course-id")?);
            match app.certificates().issue(&id).await {
                Ok(cert) => {
                    println!("Certificate of Completion");
                    println!("  Course: {}", cert.course_name);
                    println!("  Serial: {}", cert.serial);
                    println!("  Issued: {}", cert.issued_at.format("%Y-%m-%d"));
                }
                Err(CertificateError::NotEligible(course)) => {
                    println!("You must complete the course to get the certificate!");
                    println!("Back to course: {course}");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::Blogs => {
            for post in app.catalog().list_blog_posts().await? {
                println!("{:<8} {:<28} {}", post.id, post.title, post.date);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
