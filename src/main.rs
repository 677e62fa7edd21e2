use clap::{Parser, Subcommand, ValueEnum};
use keepsake::archive::{Archive, ArchiveSettings};
use keepsake::config::{self, KeepsakeConfig};
use keepsake::dates::{self, DateFormat, Locale};
use keepsake::imaging::{self, RustBackend, SourceFile};
use keepsake::output;
use keepsake::session::{FileKeyValueStore, Session};
use keepsake::store::JsonStore;
use keepsake::types::{Feedback, FeedbackKind, Movie, MovieStatus, Photo, Plan};
use std::path::{Path, PathBuf};

const SESSION_FILENAME: &str = "session.json";

#[derive(Parser)]
#[command(name = "keepsake")]
#[command(about = "A private archive for two: photos, movies, plans and notes")]
#[command(long_about = "\
A private archive for two: photos, movies, plans and notes

Everything lives in a data directory next to keepsake.toml:

  keepsake.toml          # Access codes, image budgets, locale
  .keepsake/
  ├── photos.json        # Photos with embedded, compressed images
  ├── movies.json        # Watch-list
  ├── plans.json
  ├── feedback.json
  └── session.json       # Who is logged in

Photos are scaled to at most 1200 px and re-encoded as JPEG at falling
quality until they fit the budget.

Run 'keepsake gen-config' to generate a documented keepsake.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images to fit a size budget
    Compress {
        /// Files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Where compressed files are written
        #[arg(long, default_value = "compressed")]
        out_dir: PathBuf,
        /// Size budget in KB (overrides images.max_size_kb)
        #[arg(long)]
        max_size_kb: Option<u32>,
        /// Print data URLs instead of writing files
        #[arg(long)]
        data_url: bool,
    },
    /// Show dimensions, size and type of images
    Info {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Format a date
    Date {
        input: String,
        /// short, long, relative, time or datetime
        #[arg(long, default_value = "short")]
        format: String,
        #[arg(long)]
        locale: Option<Locale>,
    },
    /// How long you have been together
    Since {
        /// Start date (defaults to dates.together_since)
        start: Option<String>,
        #[arg(long)]
        locale: Option<Locale>,
    },
    /// Log in with a four-digit access code
    Login { code: String },
    /// Forget the current session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Photo gallery
    #[command(subcommand)]
    Photo(PhotoCommand),
    /// Movie watch-list
    #[command(subcommand)]
    Movie(MovieCommand),
    /// Plans for the future
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Notes for each other
    #[command(subcommand)]
    Feedback(FeedbackCommand),
    /// Print a stock keepsake.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum PhotoCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: Option<String>,
        /// Image file to compress and embed
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List photos grouped by year
    List,
    Delete { id: String },
}

#[derive(Subcommand)]
enum MovieCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        genre: Option<String>,
        /// Already seen
        #[arg(long)]
        watched: bool,
    },
    List,
    /// Move between planned and watched
    Toggle { id: String },
    /// Rate 1-10; the same rating again clears it
    Rate { id: String, rating: u8 },
    /// Set the review; an empty string removes it
    Review { id: String, text: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum PlanCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = keepsake::types::DEFAULT_PLAN_EMOJI)]
        emoji: String,
        #[arg(long)]
        description: Option<String>,
    },
    List,
    Delete { id: String },
}

#[derive(Subcommand)]
enum FeedbackCommand {
    Add {
        #[arg(long)]
        text: String,
        #[arg(long, value_enum)]
        kind: Kind,
    },
    List,
    Delete { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Positive,
    Negative,
}

impl From<Kind> for FeedbackKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Positive => FeedbackKind::Positive,
            Kind::Negative => FeedbackKind::Negative,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config)?;
    let base_dir = cli.config.parent().unwrap_or(Path::new(""));
    let data_dir = config.store.resolve_data_dir(base_dir);
    let session = Session::new(
        config.auth.users.clone(),
        FileKeyValueStore::new(data_dir.join(SESSION_FILENAME)),
    );

    match cli.command {
        Command::Compress {
            inputs,
            out_dir,
            max_size_kb,
            data_url,
        } => {
            init_thread_pool(&config.processing);
            let mut options = config.images.compress_options();
            if let Some(kb) = max_size_kb {
                options.max_size_kb = kb;
            }
            compress(&inputs, &out_dir, &options, data_url)?;
        }
        Command::Info { files } => {
            let backend = RustBackend::new();
            for path in imaging::collect_image_files(&files) {
                let source = SourceFile::from_path(&path)?;
                let meta = imaging::image_metadata(&backend, &source);
                output::print_lines(&output::format_metadata(&source.name, &meta));
            }
        }
        Command::Date {
            input,
            format,
            locale,
        } => {
            let locale = locale.unwrap_or(config.dates.locale);
            println!(
                "{}",
                dates::format_date(&input, DateFormat::from(format.as_str()), locale)
            );
        }
        Command::Since { start, locale } => {
            let locale = locale.unwrap_or(config.dates.locale);
            let start = start
                .or_else(|| config.dates.together_since.clone())
                .ok_or("no start date: pass one or set dates.together_since")?;
            if dates::parse_date(&start).is_none() {
                println!("{}", locale.invalid_date());
            } else {
                let diff = dates::elapsed_since_at(&start, &dates::now());
                let shown = dates::format_date(&start, DateFormat::Short, locale);
                output::print_lines(&output::format_together(&shown, &diff, locale));
            }
        }
        Command::Login { code } => {
            let user = session.login(&code)?;
            println!("Logged in as {}", user);
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match session.restore()? {
            Some(user) => println!("{}", user),
            None => println!("Not logged in"),
        },
        Command::Photo(cmd) => {
            let user = session.require_user()?;
            let archive = open_archive(&config, &data_dir)?;
            match cmd {
                PhotoCommand::Add {
                    title,
                    year,
                    location,
                    description,
                    image,
                } => {
                    let upload = image.as_deref().map(SourceFile::from_path).transpose()?;
                    let photo = Photo {
                        title,
                        year,
                        location,
                        description,
                        image_data: None,
                    };
                    let doc = archive.save_photo(photo, upload.as_ref(), &user)?;
                    println!("Saved photo {}", doc.id);
                }
                PhotoCommand::List => {
                    output::print_lines(&output::format_photos(&archive.photos_by_year()?));
                }
                PhotoCommand::Delete { id } => {
                    archive.delete_photo(&id)?;
                    println!("Deleted photo {}", id);
                }
            }
        }
        Command::Movie(cmd) => {
            let user = session.require_user()?;
            let archive = open_archive(&config, &data_dir)?;
            match cmd {
                MovieCommand::Add {
                    title,
                    genre,
                    watched,
                } => {
                    let movie = Movie {
                        title,
                        genre,
                        status: if watched {
                            MovieStatus::Watched
                        } else {
                            MovieStatus::Planned
                        },
                        ..Default::default()
                    };
                    let doc = archive.add_movie(movie, &user)?;
                    println!("Added movie {}", doc.id);
                }
                MovieCommand::List => {
                    output::print_lines(&output::format_movies(&archive.movies()?));
                }
                MovieCommand::Toggle { id } => {
                    let doc = archive.toggle_status(&id, &user)?;
                    println!("{}: {}", doc.record.title, doc.record.status);
                }
                MovieCommand::Rate { id, rating } => {
                    let doc = archive.rate_movie(&id, rating, &user)?;
                    match doc.record.rating {
                        Some(r) => println!("{}: {}/10", doc.record.title, r),
                        None => println!("{}: rating cleared", doc.record.title),
                    }
                }
                MovieCommand::Review { id, text } => {
                    let doc = archive.review_movie(&id, &text, &user)?;
                    println!("Updated review for {}", doc.record.title);
                }
                MovieCommand::Delete { id } => {
                    archive.delete_movie(&id)?;
                    println!("Deleted movie {}", id);
                }
            }
        }
        Command::Plan(cmd) => {
            let user = session.require_user()?;
            let archive = open_archive(&config, &data_dir)?;
            match cmd {
                PlanCommand::Add {
                    title,
                    emoji,
                    description,
                } => {
                    let plan = Plan {
                        title,
                        emoji,
                        description,
                    };
                    let doc = archive.add_plan(plan, &user)?;
                    println!("Added plan {}", doc.id);
                }
                PlanCommand::List => output::print_lines(&output::format_plans(&archive.plans()?)),
                PlanCommand::Delete { id } => {
                    archive.delete_plan(&id)?;
                    println!("Deleted plan {}", id);
                }
            }
        }
        Command::Feedback(cmd) => {
            let user = session.require_user()?;
            let archive = open_archive(&config, &data_dir)?;
            match cmd {
                FeedbackCommand::Add { text, kind } => {
                    let feedback = Feedback {
                        text,
                        kind: kind.into(),
                    };
                    let doc = archive.add_feedback(feedback, &user)?;
                    println!("Added note {}", doc.id);
                }
                FeedbackCommand::List => {
                    output::print_lines(&output::format_feedback(&archive.feedback()?));
                }
                FeedbackCommand::Delete { id } => {
                    archive.delete_feedback(&id)?;
                    println!("Deleted note {}", id);
                }
            }
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

fn open_archive(
    config: &KeepsakeConfig,
    data_dir: &Path,
) -> Result<Archive<JsonStore, RustBackend>, Box<dyn std::error::Error>> {
    let store = JsonStore::open(data_dir)?;
    Ok(Archive::new(
        store,
        RustBackend::new(),
        ArchiveSettings::from(&config.images),
    ))
}

/// Compress every image under `inputs` in parallel, printing progress as
/// results arrive.
fn compress(
    inputs: &[PathBuf],
    out_dir: &Path,
    options: &imaging::CompressOptions,
    data_url: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    let mut sources = Vec::new();
    for path in imaging::collect_image_files(inputs) {
        match SourceFile::from_path(&path) {
            Ok(source) => {
                paths.push(path);
                sources.push(source);
            }
            Err(e) => eprintln!("{}: {}", path.display(), e),
        }
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        let mut events = Vec::new();
        for event in rx {
            if !data_url {
                output::print_lines(&output::format_compress_event(&event));
            }
            events.push(event);
        }
        events
    });
    let results = imaging::compress_files(&RustBackend::new(), &sources, options, Some(tx));
    let events = printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    let done: Vec<(&Path, imaging::CompressionResult)> = paths
        .iter()
        .map(PathBuf::as_path)
        .zip(results)
        .filter_map(|(path, result)| result.ok().map(|r| (path, r)))
        .collect();

    if data_url {
        for (_, result) in &done {
            println!("{}", imaging::to_data_url(&result.image));
        }
        return Ok(());
    }

    let plan: Vec<(&Path, bool)> = done
        .iter()
        .map(|(path, result)| (*path, result.is_passthrough()))
        .collect();
    for (relative, (_, result)) in imaging::output_paths(inputs, &plan).iter().zip(&done) {
        let target = out_dir.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(target, &result.image.data)?;
    }

    println!();
    println!("{}", output::format_compress_summary(&events));
    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
