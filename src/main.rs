use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use library_lending::config::AppConfig;
use library_lending::error::AppError;
use library_lending::lending::{
    can_be_borrowed, effective_thresholds, BookId, Clock, FixedClock, InMemoryLoanStore,
    LendingError, LendingService, LibrarySnapshot, LoanId, LoanStore, ReaderId, SnapshotError,
    SystemClock, DEFAULT_EXTENSION_DAYS,
};
use library_lending::telemetry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "library-lending",
    about = "Evaluate and record library loans against the lending policy",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lend one or more books to a reader, all or nothing
    Request(RequestArgs),
    /// Push back the due date of an existing loan
    Extend(ExtendArgs),
    /// Report whether a book currently satisfies the availability rule
    Availability(AvailabilityArgs),
    /// Print the effective thresholds for a reader role
    Thresholds(ThresholdsArgs),
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Library snapshot (JSON) to read and update
    #[arg(long)]
    snapshot: PathBuf,
    /// Reader identifier
    #[arg(long)]
    reader: String,
    /// Book identifier, repeat for multiple books
    #[arg(long = "book", required = true)]
    books: Vec<String>,
    /// Evaluation time (YYYY-MM-DDTHH:MM:SS, defaults to now)
    #[arg(long, value_parser = parse_datetime)]
    at: Option<NaiveDateTime>,
}

#[derive(Args, Debug)]
struct ExtendArgs {
    #[arg(long)]
    snapshot: PathBuf,
    /// Loan identifier
    #[arg(long)]
    loan: String,
    /// Days added to the due date
    #[arg(long, default_value_t = DEFAULT_EXTENSION_DAYS)]
    days: u32,
    #[arg(long, value_parser = parse_datetime)]
    at: Option<NaiveDateTime>,
}

#[derive(Args, Debug)]
struct AvailabilityArgs {
    #[arg(long)]
    snapshot: PathBuf,
    #[arg(long)]
    book: String,
}

#[derive(Args, Debug)]
struct ThresholdsArgs {
    /// Show the librarian thresholds instead of the regular reader ones
    #[arg(long)]
    librarian: bool,
}

#[derive(Debug, Serialize)]
struct AvailabilityView<'a> {
    book: &'a BookId,
    title: &'a str,
    initial_stock: usize,
    available_copies: usize,
    can_be_borrowed: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        let code = if err.is_rejection() { 2 } else { 1 };
        std::process::exit(code);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Request(args) => run_request(&config, args),
        Command::Extend(args) => run_extend(&config, args),
        Command::Availability(args) => run_availability(args),
        Command::Thresholds(args) => {
            let thresholds = effective_thresholds(&config.policy, args.librarian);
            print_json(&thresholds)
        }
    }
}

fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::default()))
        })
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DDTHH:MM:SS ({err})"))
}

fn run_request(config: &AppConfig, args: RequestArgs) -> Result<(), AppError> {
    let mut snapshot = LibrarySnapshot::load(&args.snapshot)?;
    let service = open_service(config, &mut snapshot, args.at);

    let reader = ReaderId(args.reader);
    let books: Vec<BookId> = args.books.into_iter().map(BookId).collect();
    let loans = service.request_loans(&reader, &books)?;

    persist(&mut snapshot, &service, &args.snapshot)?;
    info!(reader = %reader, issued = loans.len(), "request recorded");
    print_json(&loans)
}

fn run_extend(config: &AppConfig, args: ExtendArgs) -> Result<(), AppError> {
    let mut snapshot = LibrarySnapshot::load(&args.snapshot)?;
    let service = open_service(config, &mut snapshot, args.at);

    let loan = service.extend_loan(&LoanId(args.loan), args.days)?;

    persist(&mut snapshot, &service, &args.snapshot)?;
    print_json(&loan)
}

fn run_availability(args: AvailabilityArgs) -> Result<(), AppError> {
    let snapshot = LibrarySnapshot::load(&args.snapshot)?;
    let id = BookId(args.book);
    let book = snapshot
        .catalog
        .book(&id)
        .ok_or_else(|| LendingError::UnknownBook(id.clone()))?;

    print_json(&AvailabilityView {
        book: &book.id,
        title: &book.title,
        initial_stock: book.initial_stock(),
        available_copies: book.available_copies(),
        can_be_borrowed: can_be_borrowed(book),
    })
}

/// Builds a service over the snapshot's catalog and loans. A policy stored in
/// the snapshot wins over the environment.
fn open_service(
    config: &AppConfig,
    snapshot: &mut LibrarySnapshot,
    at: Option<NaiveDateTime>,
) -> LendingService<InMemoryLoanStore> {
    let policy = snapshot
        .policy
        .clone()
        .unwrap_or_else(|| config.policy.clone());
    let clock: Arc<dyn Clock> = match at {
        Some(at) => Arc::new(FixedClock(at)),
        None => Arc::new(SystemClock),
    };
    let store = InMemoryLoanStore::with_loans(std::mem::take(&mut snapshot.loans));

    LendingService::with_clock(
        Arc::new(snapshot.catalog.clone()),
        Arc::new(store),
        policy,
        clock,
    )
}

fn persist(
    snapshot: &mut LibrarySnapshot,
    service: &LendingService<InMemoryLoanStore>,
    path: &Path,
) -> Result<(), AppError> {
    snapshot.loans = service.store().all().map_err(LendingError::from)?;
    snapshot.save(path)?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let body = serde_json::to_string_pretty(value).map_err(SnapshotError::from)?;
    println!("{body}");
    Ok(())
}
