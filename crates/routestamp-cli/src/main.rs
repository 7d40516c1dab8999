mod shell;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use routestamp_core::{
    AppConfig, Country, CountryChange, CountryFilter, CountryStatus, CountryStore, Currency,
    ExitCode, ExportDocument, FileStore, ImportSummary, NewCountry, NewTrip, RouteStampError,
    SortKey, SortOrder, Trip, TripChange, TripStore, days_until, prefs, query, validate_import,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "routestamp",
    about = "Track the countries you've visited and plan your next trip",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format.
    /// Also enabled by setting ROUTESTAMP_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List countries.
    List {
        /// Case-insensitive match on name or code.
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        region: Option<String>,
        #[arg(long, conflicts_with = "unvisited")]
        visited: bool,
        #[arg(long)]
        unvisited: bool,
        /// name | visit_date | date_added | rating
        #[arg(long)]
        sort: Option<SortKey>,
        /// asc | desc (defaults to `ui.default_order`)
        #[arg(long)]
        order: Option<SortOrder>,
    },

    /// Add a country.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        region: String,
        #[command(flatten)]
        details: CountryDetails,
    },

    /// Edit a country.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[command(flatten)]
        details: CountryDetails,
        #[arg(long)]
        clear_visit_date: bool,
        #[arg(long)]
        clear_rating: bool,
    },

    /// Delete a country.
    Delete { id: String },

    /// Flip the visited flag.
    Toggle { id: String },

    /// Show travel statistics.
    Stats,

    /// Show or clear the action history.
    History {
        #[arg(long, default_value = "20")]
        limit: usize,
        #[arg(long)]
        clear: bool,
    },

    /// Trip planning.
    Trip {
        #[command(subcommand)]
        action: TripAction,
    },

    /// Export all data as JSON.
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Validate an export file; with --apply, replace current countries with it.
    Import {
        file: PathBuf,
        #[arg(long)]
        apply: bool,
    },

    /// Display currency.
    Currency {
        #[command(subcommand)]
        action: CurrencyAction,
    },

    /// Notification preferences.
    Notify {
        #[command(subcommand)]
        action: NotifyAction,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Interactive session with undo/redo.
    Shell,

    /// Show version information.
    Version,
}

#[derive(Args)]
struct CountryDetails {
    /// visited | wishlist | home | none
    #[arg(long)]
    status: Option<CountryStatus>,
    /// YYYY-MM-DD
    #[arg(long)]
    visit_date: Option<NaiveDate>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    rating: Option<u8>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long = "city", action = clap::ArgAction::Append)]
    cities: Vec<String>,
}

// ─── Trip Actions ───────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum TripAction {
    /// List all trips.
    List,
    /// Plan a trip.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value = "0")]
        budget: f64,
        #[arg(long, default_value = "")]
        companions: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Edit a trip.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long)]
        companions: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a trip.
    Delete { id: String },
    /// Show the next upcoming trip.
    Next,
    /// List trips that have not started yet, soonest first.
    Upcoming,
}

#[derive(Subcommand)]
enum CurrencyAction {
    /// Show the current currency.
    Show,
    /// List available currencies.
    List,
    /// Set the currency by ISO code.
    Set { code: String },
    /// Reset to the currency detected from the locale.
    Detect,
}

#[derive(Subcommand)]
enum NotifyAction {
    /// Show notification preferences.
    Show,
    /// Set a flag: travelReminders | achievements | updates.
    Set {
        key: String,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
    /// Set a config key and write the config file.
    Set { key: String, value: String },
    /// Print the config file path.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() {
    init_tracing();

    if let Err(err) = run() {
        let code = err
            .downcast_ref::<RouteStampError>()
            .map(RouteStampError::exit_code)
            .unwrap_or(ExitCode::GeneralError);
        eprintln!("Error: {err:#}");
        std::process::exit(code as i32);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROUTESTAMP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("ROUTESTAMP_JSON").as_deref() == Ok("1");

    let config = AppConfig::load()?;
    let backend = FileStore::new(config.storage_dir());
    tracing::debug!(dir = %backend.dir().display(), "using storage directory");

    match cli.command {
        Commands::List { search, region, visited, unvisited, sort, order } => {
            let store = open_store(&config, backend);
            let filter = CountryFilter {
                search,
                region,
                visited: match (visited, unvisited) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            let key = sort.unwrap_or(config.ui.default_sort);
            let order = order.unwrap_or(config.ui.default_order);
            let rows = query::filter_and_sort(store.countries(), &filter, key, order);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": rows, "total": rows.len() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if rows.is_empty() {
                println!("No countries match. Use `routestamp add` to add one.");
            } else {
                for c in &rows {
                    println!("{}", format_country_row(c));
                }
            }
        }

        Commands::Add { name, code, region, details } => {
            let mut store = open_store(&config, backend);
            let mut new = NewCountry::new(name, code.to_uppercase(), region);
            if let Some(status) = details.status {
                new.visited = status == CountryStatus::Visited;
                new.wishlist = status == CountryStatus::Wishlist;
                new.home = status == CountryStatus::Home;
            }
            new.visit_date = details.visit_date;
            new.rating = details.rating;
            new.notes = details.notes;
            new.cities = details.cities;

            let id = store.add(new);
            let dur = start.elapsed().as_millis();
            let country = store.get(&id).cloned();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":country,"meta":{"duration_ms":dur}}))?;
            } else if let Some(c) = country {
                println!("Added: {} ({})", c.name, c.id);
            }
        }

        Commands::Edit { id, name, code, region, details, clear_visit_date, clear_rating } => {
            let mut store = open_store(&config, backend);
            require_country(&store, &id)?;

            let mut changes = Vec::new();
            if let Some(n) = name { changes.push(CountryChange::Name(n)); }
            if let Some(c) = code { changes.push(CountryChange::Code(c.to_uppercase())); }
            if let Some(r) = region { changes.push(CountryChange::Region(r)); }
            if let Some(s) = details.status { changes.push(CountryChange::Status(s)); }
            if let Some(d) = details.visit_date { changes.push(CountryChange::VisitDate(Some(d))); }
            if clear_visit_date { changes.push(CountryChange::VisitDate(None)); }
            if let Some(r) = details.rating { changes.push(CountryChange::Rating(Some(r))); }
            if clear_rating { changes.push(CountryChange::Rating(None)); }
            if let Some(n) = details.notes {
                changes.push(CountryChange::Notes((!n.is_empty()).then_some(n)));
            }
            if !details.cities.is_empty() { changes.push(CountryChange::Cities(details.cities)); }

            if changes.is_empty() {
                return Err(RouteStampError::ValidationError("nothing to change".into()).into());
            }

            store.edit(&id, changes);
            let country = store.get(&id).cloned();
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":country,"meta":{"duration_ms":dur}}))?;
            } else if let Some(c) = country {
                println!("Updated: {}", c.name);
            }
        }

        Commands::Delete { id } => {
            let mut store = open_store(&config, backend);
            let name = require_country(&store, &id)?.name.clone();
            store.delete(&id);
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"deleted":id},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("Deleted: {name}");
            }
        }

        Commands::Toggle { id } => {
            let mut store = open_store(&config, backend);
            require_country(&store, &id)?;
            store.toggle_visited(&id);
            let country = store.get(&id).cloned();
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":country,"meta":{"duration_ms":dur}}))?;
            } else if let Some(c) = country {
                println!("{}: {}", c.name, if c.visited { "visited" } else { "not visited" });
            }
        }

        // ── Stats ──────────────────────────────────────────────────────────

        Commands::Stats => {
            let mut store = open_store(&config, backend);
            let stats = store.stats();
            let regions = query::region_breakdown(store.countries());
            let top = query::top_rated(store.countries(), 5);
            let timeline = query::timeline(store.countries(), 10);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status":"ok",
                    "data":{"stats":stats,"regions":regions,"top_rated":top,"timeline":timeline},
                    "meta":{"duration_ms":dur}
                }))?;
            } else {
                println!("Travel statistics:");
                println!("  Countries:   {}", stats.total);
                println!("  Visited:     {} ({:.0}%)", stats.visited, stats.progress_percentage);
                println!("  Wishlist:    {}", stats.wishlist);
                println!("  Home:        {}", stats.home);
                println!("  Not visited: {}", stats.not_visited);
                println!("  Regions:     {} of {}", stats.regions_visited.len(), stats.regions.len());
                if !regions.is_empty() {
                    println!("\nBy region:");
                    for r in &regions {
                        println!("  {:<15} {:>3}  {:>5.1}%", r.region, r.count, r.percentage);
                    }
                }
                if !top.is_empty() {
                    println!("\nTop rated:");
                    for c in &top {
                        println!("  {} {}", stars(c.rating), c.name);
                    }
                }
                if !timeline.is_empty() {
                    println!("\nRecent visits:");
                    for c in &timeline {
                        let date = c.visit_date.map(|d| d.to_string()).unwrap_or_default();
                        println!("  {date}  {}", c.name);
                    }
                }
            }
        }

        // ── History ────────────────────────────────────────────────────────

        Commands::History { limit, clear } => {
            let mut store = open_store(&config, backend);
            if clear {
                store.clear_history();
            }
            let entries: Vec<_> = store.history().rev().take(limit).cloned().collect();
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"items":entries,"cleared":clear},"meta":{"duration_ms":dur}}))?;
            } else if clear {
                println!("History cleared.");
            } else if entries.is_empty() {
                println!("No history.");
            } else {
                for e in &entries {
                    println!("{}  {:<15} {}", e.timestamp.format("%Y-%m-%d %H:%M"), e.action, e.describe());
                }
            }
        }

        // ── Trips ──────────────────────────────────────────────────────────

        Commands::Trip { action } => {
            let currency = prefs::load_currency(&backend, &config.locale());
            let mut trips = TripStore::load(backend);
            let now = Utc::now();

            match action {
                TripAction::List => {
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"items":trips.trips(),"total_budget":trips.total_budget()},"meta":{"duration_ms":dur}}))?;
                    } else if trips.trips().is_empty() {
                        println!("No trips planned. Use `routestamp trip add`.");
                    } else {
                        for t in trips.trips() {
                            println!("{}", format_trip_row(t, &currency));
                        }
                        println!("Total budget: {}", currency.format_amount(trips.total_budget()));
                    }
                }
                TripAction::Add { title, country, code, start: from, end, budget, companions, notes } => {
                    let id = trips.add(NewTrip {
                        title,
                        country,
                        country_code: code.to_uppercase(),
                        start_date: from,
                        end_date: end,
                        budget,
                        companions,
                        notes,
                    })?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":trips.get(&id),"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("Planned trip {id}");
                    }
                }
                TripAction::Edit { id, title, start: from, end, budget, companions, notes } => {
                    let mut changes = Vec::new();
                    if let Some(v) = title { changes.push(TripChange::Title(v)); }
                    if let Some(v) = from { changes.push(TripChange::StartDate(v)); }
                    if let Some(v) = end { changes.push(TripChange::EndDate(v)); }
                    if let Some(v) = budget { changes.push(TripChange::Budget(v)); }
                    if let Some(v) = companions { changes.push(TripChange::Companions(v)); }
                    if let Some(v) = notes { changes.push(TripChange::Notes(v)); }
                    trips.edit(&id, &changes)?;
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":trips.get(&id),"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("Updated trip {id}");
                    }
                }
                TripAction::Delete { id } => {
                    if !trips.delete(&id) {
                        return Err(RouteStampError::TripNotFound(id).into());
                    }
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"deleted":id},"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("Deleted trip {id}");
                    }
                }
                TripAction::Next => {
                    let next = trips.next_trip(now);
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        let days = next.map(|t| days_until(t, now));
                        print_json(&serde_json::json!({"status":"ok","data":{"trip":next,"days_until":days},"meta":{"duration_ms":dur}}))?;
                    } else if let Some(t) = next {
                        println!("{} to {} in {} day(s) ({} → {})", t.title, t.country, days_until(t, now), t.start_date, t.end_date);
                    } else {
                        println!("No upcoming trips.");
                    }
                }
                TripAction::Upcoming => {
                    let upcoming = trips.upcoming(now);
                    let dur = start.elapsed().as_millis();
                    if json_output {
                        let items: Vec<_> = upcoming
                            .iter()
                            .map(|t| serde_json::json!({"trip":t,"days_until":days_until(t, now)}))
                            .collect();
                        print_json(&serde_json::json!({"status":"ok","data":{"items":items},"meta":{"duration_ms":dur}}))?;
                    } else if upcoming.is_empty() {
                        println!("No upcoming trips.");
                    } else {
                        for t in upcoming {
                            println!("{:>4}d  {}", days_until(t, now), format_trip_row(t, &currency));
                        }
                    }
                }
            }
        }

        // ── Export / Import ────────────────────────────────────────────────

        Commands::Export { output } => {
            let currency = prefs::load_currency(&backend, &config.locale());
            let mut store = open_store(&config, backend);
            let doc = ExportDocument::capture(
                store.countries().to_vec(),
                currency,
                store.history().rev().cloned().collect(),
            );
            let json = doc.to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Exported {} countries to {}", doc.countries.len(), path.display());
                }
                None => println!("{json}"),
            }
            store.record_event(
                "export",
                serde_json::json!({ "count": doc.countries.len(), "version": doc.version }),
            );
        }

        Commands::Import { file, apply } => {
            let raw = std::fs::read_to_string(&file)?;
            let doc = validate_import(&raw)?;
            let summary = ImportSummary::of(&doc);

            if apply {
                let mut backend = backend;
                prefs::save_currency(&mut backend, &doc.currency)?;
                let mut store = open_store(&config, backend);
                store.import(&doc);
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"summary":summary,"applied":apply},"meta":{"duration_ms":dur}}))?;
            } else if apply {
                println!("Imported {} countries (currency {}).", summary.countries, summary.currency);
            } else {
                println!(
                    "Valid export (version {}): {} countries, {} history entries, currency {}.",
                    summary.version, summary.countries, summary.history_entries, summary.currency
                );
                println!("Re-run with --apply to replace your current countries.");
            }
        }

        // ── Preferences ────────────────────────────────────────────────────

        Commands::Currency { action } => {
            let mut backend = backend;
            let locale = config.locale();
            let currency = match action {
                CurrencyAction::Show => prefs::load_currency(&backend, &locale),
                CurrencyAction::List => {
                    for c in routestamp_core::catalog() {
                        println!("{:<4} {:<5} {}", c.code, c.symbol, c.name);
                    }
                    return Ok(());
                }
                CurrencyAction::Set { code } => {
                    let currency = Currency::from_code(&code).ok_or_else(|| {
                        RouteStampError::ValidationError(format!("unknown currency '{code}'"))
                    })?;
                    prefs::save_currency(&mut backend, &currency)?;
                    currency
                }
                CurrencyAction::Detect => {
                    let currency = Currency::detect(&locale);
                    prefs::save_currency(&mut backend, &currency)?;
                    currency
                }
            };
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":currency}))?;
            } else {
                println!("{} ({}) {}", currency.code, currency.symbol, currency.name);
            }
        }

        Commands::Notify { action } => {
            let mut backend = backend;
            let mut notifications = prefs::load_notifications(&backend);
            if let NotifyAction::Set { key, value } = action {
                if !notifications.set(&key, value) {
                    return Err(RouteStampError::ValidationError(format!("unknown notification key '{key}'")).into());
                }
                prefs::save_notifications(&mut backend, &notifications)?;
            }
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":notifications}))?;
            } else {
                println!("travelReminders = {}", notifications.travel_reminders);
                println!("achievements    = {}", notifications.achievements);
                println!("updates         = {}", notifications.updates);
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::List => {
                    let kv = config_key_values(&config);
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":kv,"meta":{"duration_ms":dur}}))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Get { key } => {
                    let kv = config_key_values(&config);
                    match kv.get(key.as_str()) {
                        Some(val) => {
                            if json_output {
                                print_json(&serde_json::json!({"status":"ok","data":{"key":key,"value":val},"meta":{"duration_ms":dur}}))?;
                            } else {
                                println!("{val}");
                            }
                        }
                        None => {
                            return Err(RouteStampError::ConfigError(format!("unknown config key: {key}")).into());
                        }
                    }
                }
                ConfigAction::Set { key, value } => {
                    // Start from the file itself so env overrides are not written back.
                    let mut file_config = AppConfig::load_from(&AppConfig::config_path())?;
                    file_config.set(&key, &value)?;
                    file_config.save()?;
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"key":key,"value":value},"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("{key} = {value}");
                    }
                }
                ConfigAction::Path => println!("{}", AppConfig::config_path().display()),
            }
        }

        Commands::Shell => {
            let store = open_store(&config, backend);
            let mut session = shell::Shell::new(store, config.ui.default_sort, config.ui.default_order);
            let stdin = std::io::stdin();
            let prompt = stdin.is_terminal();
            if prompt {
                println!("RouteStamp shell. Type `help` for commands.");
            }
            session.run(stdin.lock(), std::io::stdout(), prompt)?;
        }

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version}}))?;
            } else {
                println!("routestamp v{version}");
            }
        }
    }

    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_store(config: &AppConfig, backend: FileStore) -> CountryStore<FileStore> {
    CountryStore::load_with_capacity(backend, config.history.audit_capacity)
}

fn require_country<'a>(store: &'a CountryStore<FileStore>, id: &str) -> Result<&'a Country> {
    store
        .get(id)
        .ok_or_else(|| RouteStampError::CountryNotFound(id.to_string()).into())
}

fn short_id(id: &str) -> &str {
    let end = id.char_indices().nth(10).map(|(i, _)| i).unwrap_or(id.len());
    &id[..end]
}

fn stars(rating: Option<u8>) -> String {
    let n = rating.unwrap_or(0) as usize;
    format!("{}{}", "★".repeat(n), "☆".repeat(5 - n.min(5)))
}

fn format_trip_row(t: &Trip, currency: &Currency) -> String {
    format!(
        "{id}  {title:<30} {country:<15} {start} → {end} ({days}d)  {budget}",
        id = short_id(&t.id),
        title = t.title,
        country = t.country,
        start = t.start_date,
        end = t.end_date,
        days = t.duration_days(),
        budget = currency.format_amount(t.budget),
    )
}

/// One-line listing used by `list` and the shell.
pub(crate) fn format_country_row(c: &Country) -> String {
    let date = c.visit_date.map(|d| d.to_string()).unwrap_or_default();
    format!(
        "{id:<26}  {code}  {name:<25} {region:<14} {status:<8} {date:<10} {rating}",
        id = c.id,
        code = c.code,
        name = c.name,
        region = c.region,
        status = c.status(),
        rating = if c.rating.is_some() { stars(c.rating) } else { String::new() },
    )
}

fn config_key_values(config: &AppConfig) -> std::collections::BTreeMap<&'static str, String> {
    let mut map = std::collections::BTreeMap::new();
    map.insert("config_path", AppConfig::config_path().to_string_lossy().to_string());
    map.insert("data_dir", config.storage_dir().to_string_lossy().to_string());
    map.insert("audit_capacity", config.history.audit_capacity.to_string());
    map.insert("default_sort", config.ui.default_sort.as_str().to_string());
    map.insert("default_order", config.ui.default_order.label().to_string());
    map.insert("locale", config.locale());
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_details() {
        let cli = Cli::try_parse_from([
            "routestamp", "add", "--name", "Peru", "--code", "pe", "--region", "South America",
            "--status", "visited", "--rating", "4", "--city", "Lima", "--city", "Cusco",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { details, .. } => {
                assert_eq!(details.status, Some(CountryStatus::Visited));
                assert_eq!(details.rating, Some(4));
                assert_eq!(details.cities, vec!["Lima", "Cusco"]);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let res = Cli::try_parse_from([
            "routestamp", "add", "--name", "Peru", "--code", "PE", "--region", "x", "--rating", "6",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_notify_set_takes_explicit_bool() {
        let cli = Cli::try_parse_from(["routestamp", "notify", "set", "achievements", "true"]).unwrap();
        match cli.command {
            Commands::Notify { action: NotifyAction::Set { key, value } } => {
                assert_eq!(key, "achievements");
                assert!(value);
            }
            _ => panic!("expected notify set"),
        }

        let cli = Cli::try_parse_from(["routestamp", "notify", "set", "updates", "false"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Notify { action: NotifyAction::Set { value: false, .. } }
        ));

        assert!(Cli::try_parse_from(["routestamp", "notify", "set", "updates"]).is_err());
    }

    #[test]
    fn test_list_order_flag() {
        let cli = Cli::try_parse_from(["routestamp", "list", "--order", "asc"]).unwrap();
        assert!(matches!(cli.command, Commands::List { order: Some(SortOrder::Asc), .. }));

        let cli = Cli::try_parse_from(["routestamp", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List { order: None, .. }));

        assert!(Cli::try_parse_from(["routestamp", "list", "--order", "up"]).is_err());
    }

    #[test]
    fn test_config_values_use_config_spelling() {
        let mut config = AppConfig::default();
        config.set("default_sort", "visit_date").unwrap();
        config.set("default_order", "desc").unwrap();
        let kv = config_key_values(&config);
        assert_eq!(kv["default_sort"], "visit_date");
        assert_eq!(kv["default_order"], "desc");
    }

    #[test]
    fn test_trip_row_shows_duration() {
        let trip = Trip::from_new(
            "01HZXYZABCDEFGHJKMNPQRSTVW",
            NewTrip {
                title: "Rail pass".into(),
                country: "Japan".into(),
                country_code: "JP".into(),
                start_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
                budget: 2500.0,
                companions: String::new(),
                notes: String::new(),
            },
            Utc::now(),
        );
        let row = format_trip_row(&trip, &Currency::usd());
        assert!(row.contains("(10d)"));
        assert!(row.contains("$2500.00"));
    }

    #[test]
    fn test_stars_and_short_id() {
        assert_eq!(stars(Some(3)), "★★★☆☆");
        assert_eq!(stars(None), "☆☆☆☆☆");
        assert_eq!(short_id("01HZXYZABCDEFGHJKMNPQRSTVW"), "01HZXYZABC");
        assert_eq!(short_id("7"), "7");
    }
}
