use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use photo_gallery::{
    Config, FileStore, Gallery, MemoryStore, Photo, SuggestionHistory, SuggestionStore,
};

#[derive(Parser)]
#[command(name = "photo-gallery", about = "Search Flickr photos from the terminal")]
struct Cli {
    /// Keep suggestion history in memory instead of on disk.
    #[arg(long, global = true)]
    memory: bool,

    /// Print photos as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search by tag (or list recent photos when TERM is omitted).
    Search {
        term: Option<String>,
        /// How many pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Print the remembered search terms.
    Suggestions,
    /// Read searches and commands from stdin.
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Suggestions => {
            let store = open_store(cli.memory, Config::history_path_from_env());
            print_suggestions(&SuggestionHistory::load(store.as_ref()));
        }
        Command::Search { term, pages } => {
            let mut gallery = build_gallery(cli.memory)?;
            if let Some(term) = term {
                gallery.update_draft(term);
            }
            gallery.submit();
            run_pages(&mut gallery, pages, cli.json).await;
        }
        Command::Interactive => {
            let mut gallery = build_gallery(cli.memory)?;
            interactive(&mut gallery, cli.json).await?;
        }
    }

    Ok(())
}

fn build_gallery(memory: bool) -> Result<Gallery> {
    let config = Config::from_env()?;
    config.log_redacted();

    let source = Arc::new(config.flickr_client()?);
    let store = open_store(memory, config.history_path.clone());
    Ok(Gallery::new(source, store, config.page_size))
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("photo_gallery=info".parse()?);
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn open_store(memory: bool, path: std::path::PathBuf) -> Arc<dyn SuggestionStore> {
    if memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(path))
    }
}

/// Settle the current page, then keep firing the visibility signal until
/// `pages` pages have loaded or the results run out.
async fn run_pages(gallery: &mut Gallery, pages: u32, json: bool) {
    let mut printed = 0;
    loop {
        gallery.settle().await;
        printed = print_new(gallery, printed, json);
        if gallery.state().error || gallery.page() >= pages || !gallery.on_last_item_visible() {
            break;
        }
    }
    report_status(gallery);
}

const USAGE: &str = "Commands: :more  :pick N  :s  :q";

/// One line of interactive input.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Quit,
    Suggestions,
    More,
    Pick(Option<usize>),
    Unknown(&'a str),
    /// Submit the given text, or the current draft when `None`.
    Submit(Option<&'a str>),
}

impl<'a> Input<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            ":q" => Input::Quit,
            ":s" => Input::Suggestions,
            ":more" => Input::More,
            "" => Input::Submit(None),
            _ => match line.strip_prefix(":pick") {
                Some(rest) => Input::Pick(rest.trim().parse().ok()),
                None if line.starts_with(':') => Input::Unknown(line),
                None => Input::Submit(Some(line)),
            },
        }
    }
}

async fn interactive(gallery: &mut Gallery, json: bool) -> Result<()> {
    println!("Type a tag and press enter. {USAGE}");
    print_suggestions(gallery.suggestions());

    gallery.start();
    gallery.settle().await;
    let mut printed = print_new(gallery, 0, json);
    report_status(gallery);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Quit => break,
            Input::Suggestions => print_suggestions(gallery.suggestions()),
            Input::More => {
                if gallery.on_last_item_visible() {
                    gallery.settle().await;
                    printed = print_new(gallery, printed, json);
                }
                report_status(gallery);
            }
            Input::Pick(index) => {
                let picked = index.and_then(|i| gallery.suggestions().get(i).map(str::to_string));
                match picked {
                    Some(term) => {
                        gallery.select_suggestion(term);
                        println!("draft: {}  (press enter to search)", gallery.draft());
                    }
                    None => println!("no such suggestion"),
                }
            }
            Input::Unknown(command) => println!("unknown command {command}. {USAGE}"),
            Input::Submit(text) => {
                if let Some(text) = text {
                    gallery.update_draft(text);
                }
                gallery.submit();
                gallery.settle().await;
                printed = print_new(gallery, 0, json);
                report_status(gallery);
            }
        }
    }

    info!("Interactive session finished");
    Ok(())
}

/// Print photos from index `from` onward; returns the new printed count.
fn print_new(gallery: &Gallery, from: usize, json: bool) -> usize {
    let photos = &gallery.state().photos;
    for (i, photo) in photos.iter().enumerate().skip(from) {
        print_photo(i, photo, json);
    }
    photos.len()
}

fn print_photo(index: usize, photo: &Photo, json: bool) {
    if json {
        match serde_json::to_string(photo) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("failed to encode photo {}: {e}", photo.id),
        }
    } else {
        let title = if photo.title.is_empty() { "(untitled)" } else { photo.title.as_str() };
        println!("{:>4}  {}\t{}", index + 1, title, photo.image_url);
    }
}

fn report_status(gallery: &Gallery) {
    let state = gallery.state();
    let mode = if gallery.query().is_empty() {
        "recent".to_string()
    } else {
        format!("tag \"{}\"", gallery.query())
    };
    if state.error {
        eprintln!("Something went wrong fetching {mode}, page {}.", gallery.page());
    } else if state.is_empty_result() {
        eprintln!("No Result");
    } else if !state.has_more {
        eprintln!("{mode}: {} photos, no more pages", state.photos.len());
    } else {
        eprintln!("{mode}: {} photos through page {}", state.photos.len(), gallery.page());
    }
}

fn print_suggestions(history: &SuggestionHistory) {
    if history.is_empty() {
        return;
    }
    let listed: Vec<String> = history
        .iter()
        .enumerate()
        .map(|(i, term)| format!("[{i}] {term}"))
        .collect();
    println!("Suggestions: {}", listed.join("  "));
}
