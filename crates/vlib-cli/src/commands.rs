use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tracing::debug;
use vlib_sdk::{
    Book, BookDraft, BookPosition, LibraryConfig, LibraryError, LocalLibrary, VirtualLibrary,
};

use crate::cli::*;

const DEFAULT_CONFIG_FILE: &str = "vlib.toml";

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.data_dir)?;
    let library = VirtualLibrary::open_local(&config)
        .with_context(|| format!("failed to open library in {}", config.data_dir.display()))?;
    library.load_library().await?;

    let format = cli.format;
    let result = match cli.command {
        Command::Init(args) => cmd_init(&library, &config, args),
        Command::Status(_) => cmd_status(&library, &config, format),
        Command::List(_) => cmd_list(&library, format),
        Command::Show(args) => cmd_show(&library, args, format),
        Command::Add(args) => cmd_add(&library, args, format).await,
        Command::Move(args) => cmd_move(&library, args).await,
        Command::Delete(args) => cmd_delete(&library, args).await,
        Command::AddBookcase(_) => cmd_add_bookcase(&library, format).await,
        Command::Slots(args) => cmd_slots(&library, args, format),
        Command::NextSlot(_) => cmd_next_slot(&library, format),
        Command::Cover(args) => cmd_cover(&library, args).await,
        Command::Import(args) => cmd_import(&library, args).await,
        Command::Export(args) => cmd_export(&library, args).await,
    };

    if let Err(e) = &result {
        if let Some(notice) = e.downcast_ref::<LibraryError>().and_then(notification) {
            eprintln!("{} {}", "✗".red().bold(), notice.yellow());
        }
    }
    result
}

/// Explicit `--config`, else `./vlib.toml` if it exists, else defaults.
fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> anyhow::Result<LibraryConfig> {
    let mut config = match path {
        Some(path) => LibraryConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            LibraryConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => LibraryConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    debug!(data_dir = %config.data_dir.display(), "config loaded");
    Ok(config)
}

/// The message shown to the user for failures they can act on.
fn notification(error: &LibraryError) -> Option<&'static str> {
    match error {
        LibraryError::AllocationExhausted => {
            Some("All bookcases are full! Add a new bookcase first.")
        }
        LibraryError::CoverGeneration(_) => {
            Some("Failed to generate a cover. Check the API key or try again.")
        }
        LibraryError::FileRead { .. } => Some("Could not read the file."),
        LibraryError::ImportFormat(_) => Some("Invalid library file format."),
        LibraryError::SlotOccupied { .. } => Some("That slot is already taken."),
        LibraryError::Persisted(_) => {
            Some("The stored library is damaged. Import a backup to replace it.")
        }
        _ => None,
    }
}

/// Look a book up by full id or unique id prefix.
fn find_book<'a>(books: &'a [Book], query: &str) -> anyhow::Result<&'a Book> {
    if let Some(book) = books.iter().find(|book| book.id.as_str() == query) {
        return Ok(book);
    }
    let mut matches = books.iter().filter(|book| book.id.as_str().starts_with(query));
    match (matches.next(), matches.next()) {
        (Some(book), None) if !query.is_empty() => Ok(book),
        (Some(_), Some(_)) => bail!("id prefix {query:?} matches more than one book"),
        _ => bail!("no book with id {query:?}"),
    }
}

/// Covers embedded as data URLs are summarized rather than printed.
fn describe_cover(url: &str) -> String {
    match url.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or("image");
            format!("embedded {mime} ({} bytes encoded)", url.len())
        }
        None if url.is_empty() => "none".to_string(),
        None => url.to_string(),
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_book_line(book: &Book) {
    let badge = if book.cover_generated {
        " [generated cover]".cyan().to_string()
    } else {
        String::new()
    };
    println!(
        "{}  {}  {} by {}{}",
        book.position.to_string().dimmed(),
        book.id.as_str().yellow(),
        book.title.bold(),
        book.author,
        badge
    );
}

fn cmd_init(
    library: &LocalLibrary,
    config: &LibraryConfig,
    args: InitArgs,
) -> anyhow::Result<()> {
    println!(
        "{} Virtual library ready in {}",
        "✓".green().bold(),
        config.data_dir.display().to_string().bold()
    );
    let snapshot = library.snapshot();
    println!("  Bookcases: {}", snapshot.bookcases.len());
    println!("  Books: {}", snapshot.books.len());

    if args.write_config {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            println!("  {} already exists, left unchanged", DEFAULT_CONFIG_FILE.bold());
        } else {
            std::fs::write(path, config.to_toml_string()?)
                .with_context(|| format!("failed to write {DEFAULT_CONFIG_FILE}"))?;
            println!("  Wrote {}", DEFAULT_CONFIG_FILE.bold());
        }
    }
    Ok(())
}

fn cmd_status(
    library: &LocalLibrary,
    config: &LibraryConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let snapshot = library.snapshot();
    let capacity = library.capacity();
    let next = library.next_available_slot();

    if format == OutputFormat::Json {
        return print_json(&json!({
            "dataDir": config.data_dir,
            "bookcases": snapshot.bookcases.len(),
            "books": snapshot.books.len(),
            "capacity": capacity,
            "nextSlot": next,
        }));
    }

    println!("Library in {}", config.data_dir.display().to_string().bold());
    println!("  Bookcases: {}", snapshot.bookcases.len().to_string().bold());
    println!("  Books: {} / {} slots", snapshot.books.len().to_string().bold(), capacity);
    match next {
        Some(position) => println!("  Next slot: {}", position.to_string().cyan()),
        None => println!("  Next slot: {}", "none (all bookcases full)".red()),
    }
    Ok(())
}

fn cmd_list(library: &LocalLibrary, format: OutputFormat) -> anyhow::Result<()> {
    let snapshot = library.snapshot();
    let mut books = snapshot.books.clone();
    // Shelf order: bookcases as stored, then shelf, then slot.
    books.sort_by_key(|book| {
        let case = snapshot
            .bookcases
            .iter()
            .position(|bookcase| bookcase.id == book.position.bookcase_id);
        (case, book.position.shelf_index, book.position.slot_index)
    });
    if format == OutputFormat::Json {
        return print_json(&books);
    }
    if books.is_empty() {
        println!("No books yet.");
    }
    for book in &books {
        print_book_line(book);
    }
    Ok(())
}

fn cmd_show(
    library: &LocalLibrary,
    args: ShowArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let snapshot = library.snapshot();
    let book = find_book(&snapshot.books, &args.id)?;
    if format == OutputFormat::Json {
        return print_json(book);
    }
    println!("{}", book.title.bold());
    println!("  by {}", book.author);
    println!("  Id: {}", book.id.as_str().yellow());
    println!("  Position: {}", book.position.to_string().cyan());
    println!("  Added: {}", book.created_at.to_rfc3339());
    let origin = if book.cover_generated { "generated" } else { "supplied" };
    println!("  Cover ({origin}): {}", describe_cover(&book.cover_url));
    if !book.description.is_empty() {
        println!("\n{}", book.description);
    }
    Ok(())
}

async fn cmd_add(
    library: &LocalLibrary,
    args: AddArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut draft = BookDraft::new(args.title, args.author).with_description(args.description);
    if let Some(url) = args.cover_url {
        draft = draft.with_cover_url(url);
    }
    if args.cover_file.is_none() && draft.explicit_cover().is_none() {
        println!("Generating cover...");
    }
    let book = library.add_book(draft, args.cover_file.as_deref()).await?;
    if format == OutputFormat::Json {
        return print_json(&book);
    }
    println!("{} Added {}", "✓".green().bold(), book.title.bold());
    println!("  Id: {}", book.id.as_str().yellow());
    println!("  Position: {}", book.position.to_string().cyan());
    Ok(())
}

async fn cmd_move(library: &LocalLibrary, args: MoveArgs) -> anyhow::Result<()> {
    let id = find_book(&library.snapshot().books, &args.id)?.id.clone();
    let target = BookPosition::new(args.bookcase, args.shelf, args.slot);
    library.set_moving_book(Some(id.clone()));
    if !library.update_book_position(&id, target.clone()).await? {
        bail!("no book with id {:?}", args.id);
    }
    println!(
        "{} Moved {} to {}",
        "✓".green().bold(),
        id.as_str().yellow(),
        target.to_string().cyan()
    );
    Ok(())
}

async fn cmd_delete(library: &LocalLibrary, args: DeleteArgs) -> anyhow::Result<()> {
    let id = find_book(&library.snapshot().books, &args.id)?.id.clone();
    match library.delete_book(&id).await? {
        Some(book) => println!("{} Deleted {}", "✓".green().bold(), book.title.bold()),
        None => bail!("no book with id {:?}", args.id),
    }
    Ok(())
}

async fn cmd_add_bookcase(library: &LocalLibrary, format: OutputFormat) -> anyhow::Result<()> {
    let bookcase = library.add_bookcase().await?;
    if format == OutputFormat::Json {
        return print_json(&bookcase);
    }
    println!(
        "{} Added {} ({} shelves x {} slots)",
        "✓".green().bold(),
        bookcase.id.as_str().bold(),
        bookcase.shelves,
        bookcase.slots_per_shelf
    );
    Ok(())
}

fn cmd_slots(
    library: &LocalLibrary,
    args: SlotsArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let shown = library.free_slots(args.limit);
    if format == OutputFormat::Json {
        return print_json(&shown);
    }
    if shown.is_empty() && library.next_available_slot().is_none() {
        println!("{}", "All bookcases are full! Add a new bookcase first.".yellow());
        return Ok(());
    }
    for position in &shown {
        println!("  {position}");
    }
    let more = library.free_slot_count().saturating_sub(shown.len() as u64);
    if more > 0 {
        println!("  ... and {more} more");
    }
    Ok(())
}

fn cmd_next_slot(library: &LocalLibrary, format: OutputFormat) -> anyhow::Result<()> {
    let next = library.next_available_slot();
    if format == OutputFormat::Json {
        return print_json(&next);
    }
    match next {
        Some(position) => println!("{}", position.to_string().cyan()),
        None => println!("{}", "All bookcases are full! Add a new bookcase first.".yellow()),
    }
    Ok(())
}

async fn cmd_cover(library: &LocalLibrary, args: CoverArgs) -> anyhow::Result<()> {
    let id = find_book(&library.snapshot().books, &args.id)?.id.clone();
    println!("Generating cover...");
    match library.generate_cover_for_book(&id).await? {
        Some(book) => println!("{} New cover for {}", "✓".green().bold(), book.title.bold()),
        None => bail!("no book with id {:?}", args.id),
    }
    Ok(())
}

async fn cmd_import(library: &LocalLibrary, args: ImportArgs) -> anyhow::Result<()> {
    let document = library.import_library_file(&args.file).await?;
    println!(
        "{} Imported {} books in {} bookcases from {}",
        "✓".green().bold(),
        document.books.len(),
        document.bookcases.len(),
        args.file.display()
    );
    Ok(())
}

async fn cmd_export(library: &LocalLibrary, args: ExportArgs) -> anyhow::Result<()> {
    match args.file {
        Some(target) => {
            let path = library.export_library_to(&target).await?;
            println!(
                "{} Exported to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
        }
        None => println!("{}", library.export_library()?),
    }
    Ok(())
}
