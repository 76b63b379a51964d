use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use closet_lib::community::PostDraft;
use closet_lib::config::{Config, ENV_PASSWORD, ENV_USER};
use closet_lib::model::{ClothingFields, ImageUpload, Profile};
use closet_lib::stats::{color_distribution, style_distribution, Bucket};
use closet_lib::store::SET_ASIDE_INFIX;
use closet_lib::wear_log::WearSource;
use closet_lib::weather::{recommend, Vocabulary};
use closet_lib::{init_logging, Session};

/// Exit code used when a post is rejected by validation.
const REJECTED_EXIT_CODE: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "closet", about = "Personal wardrobe manager", version)]
struct Cli {
    /// Directory holding the CSV/JSON tables and the images folder.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Login name (falls back to CLOSET_USER).
    #[arg(long, global = true)]
    user: Option<String>,
    /// Login password (falls back to CLOSET_PASSWORD).
    #[arg(long, global = true)]
    password: Option<String>,
    /// Emit JSON instead of the text view.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage clothing items.
    #[command(subcommand)]
    Wardrobe(WardrobeCommand),
    /// Show colour and style distributions.
    Stats,
    /// Suggest items for today's weather, e.g. `비`, `추움`, `더움`, `맑음`.
    Recommend {
        weather: String,
        /// Match English keywords and values (rain/cold/hot/clear, Outer/Top...).
        #[arg(long)]
        english: bool,
    },
    /// Record and view what was worn.
    #[command(subcommand)]
    Wear(WearCommand),
    /// Community board.
    #[command(subcommand)]
    Post(PostCommand),
    /// Body profile.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Debug, Subcommand)]
enum WardrobeCommand {
    /// Add an item, optionally with a photo.
    Add {
        #[command(flatten)]
        fields: FieldArgs,
        /// JPEG or PNG photo to copy into the images folder.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List items with their photo status.
    List,
}

#[derive(Debug, Subcommand)]
enum WearCommand {
    /// Log an outfit by wardrobe position or by typed fields.
    Log {
        /// Date worn (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// 1-based position as shown by `wardrobe list`.
        #[arg(long, conflicts_with_all = ["category", "color", "style", "size"])]
        item: Option<usize>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Show the log in insertion order.
    List,
    /// Show the log as all-day calendar events.
    Calendar,
}

#[derive(Debug, Subcommand)]
enum PostCommand {
    /// Publish a post. `--content` wins over `--short` when both are given.
    Add {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        short: String,
    },
    /// Show posts, newest first.
    List,
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    /// Replace the profile.
    Set {
        #[arg(long, default_value = "")]
        gender: String,
        #[arg(long, default_value = "")]
        height: String,
        #[arg(long, default_value = "")]
        weight: String,
        #[arg(long, default_value = "")]
        body_type: String,
        #[arg(long, default_value = "")]
        favorite_brand: String,
    },
    Show,
}

#[derive(Debug, Args)]
struct FieldArgs {
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    color: String,
    #[arg(long, default_value = "")]
    style: String,
    #[arg(long, default_value = "")]
    size: String,
}

impl From<FieldArgs> for ClothingFields {
    fn from(args: FieldArgs) -> Self {
        ClothingFields::new(args.category, args.color, args.style, args.size)
    }
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = Config::from_env(cli.data_dir.clone())?;
    let _logging = init_logging(&config)?;

    let user = cli
        .user
        .clone()
        .or_else(|| std::env::var(ENV_USER).ok())
        .unwrap_or_default();
    let password = cli
        .password
        .clone()
        .or_else(|| std::env::var(ENV_PASSWORD).ok())
        .unwrap_or_default();

    let mut session = Session::new(config.layout());
    let failures = session.login(&user, &password)?;
    for (table, err) in &failures {
        eprintln!(
            "warning: {table} could not be loaded and starts empty: {err}\n\
             warning: {} will be renamed to {}{}<timestamp> before anything is saved",
            table.file_name(),
            table.file_name(),
            SET_ASIDE_INFIX,
        );
    }

    let json = cli.json;
    let outcome = handle_command(&mut session, cli.command, json)?;
    match outcome {
        Outcome::Changed => {
            session.logout()?;
            Ok(0)
        }
        Outcome::Unchanged => Ok(0),
        Outcome::Rejected(reason) => {
            eprintln!("warning: {reason}");
            Ok(REJECTED_EXIT_CODE)
        }
    }
}

enum Outcome {
    Changed,
    Unchanged,
    Rejected(String),
}

fn handle_command(session: &mut Session, command: Commands, json: bool) -> Result<Outcome> {
    match command {
        Commands::Wardrobe(cmd) => handle_wardrobe(session, cmd, json),
        Commands::Stats => {
            let store = session.store()?;
            let colors = color_distribution(store.wardrobe());
            let styles = style_distribution(store.wardrobe());
            if json {
                print_json(&serde_json::json!({ "colors": colors, "styles": styles }))?;
            } else if store.wardrobe().is_empty() {
                println!("The wardrobe is empty.");
            } else {
                print_buckets("Colours", &colors);
                print_buckets("Styles", &styles);
            }
            Ok(Outcome::Unchanged)
        }
        Commands::Recommend { weather, english } => {
            let vocabulary = if english {
                Vocabulary::english()
            } else {
                Vocabulary::korean()
            };
            let rec = recommend(&vocabulary, session.store()?.wardrobe(), &weather);
            if json {
                print_json(&rec)?;
            } else {
                if let Some(advice) = &rec.advice {
                    println!("{advice}");
                }
                if rec.items.is_empty() {
                    println!("Nothing in the wardrobe fits. Add a few more items!");
                }
                for item in &rec.items {
                    println!("{}", item.label());
                }
            }
            Ok(Outcome::Unchanged)
        }
        Commands::Wear(cmd) => handle_wear(session, cmd, json),
        Commands::Post(cmd) => handle_post(session, cmd, json),
        Commands::Profile(cmd) => handle_profile(session, cmd, json),
    }
}

fn handle_wardrobe(session: &mut Session, cmd: WardrobeCommand, json: bool) -> Result<Outcome> {
    match cmd {
        WardrobeCommand::Add { fields, image } => {
            let upload = image.as_deref().map(read_image).transpose()?;
            let layout = session.layout().clone();
            let item = session
                .store_mut()?
                .add_wardrobe_item(&layout, fields.into(), upload.as_ref())?;
            if json {
                print_json(&item)?;
            } else {
                println!("Added {}", item.label());
            }
            Ok(Outcome::Changed)
        }
        WardrobeCommand::List => {
            let layout = session.layout();
            let store = session.store()?;
            if json {
                print_json(&store.wardrobe())?;
            } else if store.wardrobe().is_empty() {
                println!("The wardrobe is empty. Add something first!");
            } else {
                for (idx, item) in store.wardrobe().iter().enumerate() {
                    match store.wardrobe_image(layout, idx) {
                        Some(path) => println!("{}. {} [{}]", idx + 1, item.label(), path.display()),
                        None => println!("{}. {}", idx + 1, item.label()),
                    }
                }
            }
            Ok(Outcome::Unchanged)
        }
    }
}

fn handle_wear(session: &mut Session, cmd: WearCommand, json: bool) -> Result<Outcome> {
    match cmd {
        WearCommand::Log { date, item, fields } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let source = match item {
                Some(0) => bail!("--item positions start at 1"),
                Some(position) => WearSource::Wardrobe(position - 1),
                None => WearSource::Manual(fields.into()),
            };
            let entry = session.store_mut()?.log_wear(date, source)?;
            if json {
                print_json(&entry)?;
            } else {
                println!(
                    "{}: {} - {} - {} - {}",
                    entry.date, entry.category, entry.style, entry.color, entry.size
                );
            }
            Ok(Outcome::Changed)
        }
        WearCommand::List => {
            let store = session.store()?;
            if json {
                print_json(&store.wear_log())?;
            } else {
                for entry in store.wear_log() {
                    println!(
                        "{}  {} - {} - {} - {}",
                        entry.date, entry.category, entry.style, entry.color, entry.size
                    );
                }
            }
            Ok(Outcome::Unchanged)
        }
        WearCommand::Calendar => {
            let events = session.store()?.calendar_events();
            if json {
                print_json(&events)?;
            } else {
                for event in &events {
                    println!("{}  {}", event.start, event.title);
                }
            }
            Ok(Outcome::Unchanged)
        }
    }
}

fn handle_post(session: &mut Session, cmd: PostCommand, json: bool) -> Result<Outcome> {
    match cmd {
        PostCommand::Add {
            title,
            content,
            short,
        } => {
            let draft = PostDraft {
                title,
                long_content: content,
                short_content: short,
            };
            match session.store_mut()?.add_post(draft) {
                Ok(post) => {
                    if json {
                        print_json(&post)?;
                    } else {
                        println!("Posted \"{}\"", post.title);
                    }
                    Ok(Outcome::Changed)
                }
                Err(reason) => Ok(Outcome::Rejected(reason.to_string())),
            }
        }
        PostCommand::List => {
            let store = session.store()?;
            let posts: Vec<_> = store.posts_for_display().collect();
            if json {
                print_json(&posts)?;
            } else if posts.is_empty() {
                println!("No posts yet. Be the first!");
            } else {
                for (idx, post) in posts.iter().enumerate() {
                    println!("{}. {}", idx + 1, post.title);
                    println!("{}", post.content);
                }
            }
            Ok(Outcome::Unchanged)
        }
    }
}

fn handle_profile(session: &mut Session, cmd: ProfileCommand, json: bool) -> Result<Outcome> {
    match cmd {
        ProfileCommand::Set {
            gender,
            height,
            weight,
            body_type,
            favorite_brand,
        } => {
            session.set_profile(Profile {
                gender,
                height,
                weight,
                body_type,
                favorite_brand,
            })?;
            Ok(Outcome::Changed)
        }
        ProfileCommand::Show => {
            match session.profile()? {
                Some(profile) if json => print_json(profile)?,
                Some(profile) => {
                    println!("gender: {}", profile.gender);
                    println!("height: {}", profile.height);
                    println!("weight: {}", profile.weight);
                    println!("body type: {}", profile.body_type);
                    println!("favourite brand: {}", profile.favorite_brand);
                }
                None if json => println!("{{}}"),
                None => println!("No profile yet."),
            }
            Ok(Outcome::Unchanged)
        }
    }
}

fn read_image(path: &Path) -> Result<ImageUpload> {
    let supported = mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| matches!(mime.essence_str(), "image/jpeg" | "image/png"));
    if !supported {
        bail!("unsupported image type: {} (use jpg, jpeg or png)", path.display());
    }
    let bytes = std::fs::read(path).with_context(|| format!("read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageUpload { file_name, bytes })
}

fn print_buckets(heading: &str, buckets: &[Bucket]) {
    println!("{heading}");
    for bucket in buckets {
        println!("  {:<12} {}", bucket.value, bucket.count);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
