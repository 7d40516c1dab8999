use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::NaiveDate;
use routestamp_core::{
    CountryChange, CountryFilter, CountryStatus, CountryStore, KeyValueStore, NewCountry,
    SortKey, SortOrder, query, validate_rating,
};

const HELP: &str = "\
Commands:
  add <name> <code> <region...>   add a country (quote names with spaces)
  edit <id> <field>=<value>...    fields: name code region status visit_date rating notes cities
                                  an empty value clears optional fields
  delete <id>                     remove a country
  toggle <id>                     flip visited
  undo | u                        undo last change
  redo | r                        redo last undone change
  list [search]                   list countries
  sort <key> [asc|desc]           key: name visit_date date_added rating
  history                         show the audit log
  clear                           clear audit log and undo history
  stats                           summary statistics
  help                            this text
  quit | q                        leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Add(NewCountry),
    Edit {
        id: String,
        changes: Vec<CountryChange>,
    },
    Delete(String),
    Toggle(String),
    Undo,
    Redo,
    List(String),
    Sort(SortKey, SortOrder),
    History,
    Clear,
    Stats,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

/// Split a line on whitespace, keeping double-quoted runs together.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

/// Parse one `field=value` assignment.
pub fn parse_change(assignment: &str) -> std::result::Result<CountryChange, String> {
    let (field, value) = assignment
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{assignment}'"))?;
    let value = value.trim();
    let optional = |v: &str| (!v.is_empty()).then(|| v.to_string());

    let change = match field.trim() {
        "name" => CountryChange::Name(value.to_string()),
        "code" => CountryChange::Code(value.to_uppercase()),
        "region" => CountryChange::Region(value.to_string()),
        "status" => CountryChange::Status(value.parse::<CountryStatus>()?),
        "visit_date" | "date" => CountryChange::VisitDate(match optional(value) {
            Some(v) => Some(
                NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                    .map_err(|e| format!("bad date '{v}': {e}"))?,
            ),
            None => None,
        }),
        "rating" => CountryChange::Rating(match optional(value) {
            Some(v) => {
                let n: u8 = v.parse().map_err(|_| format!("bad rating '{v}'"))?;
                Some(validate_rating(n).map_err(|e| e.to_string())?)
            }
            None => None,
        }),
        "notes" => CountryChange::Notes(optional(value)),
        "cities" => CountryChange::Cities(
            value
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        other => return Err(format!("unknown field '{other}'")),
    };
    Ok(change)
}

/// Parse a raw shell line.
pub fn parse_command(line: &str) -> ShellCommand {
    let tokens = tokenize(line);
    let parts: Vec<&str> = tokens.iter().map(String::as_str).collect();

    match parts.as_slice() {
        [] => ShellCommand::Empty,
        ["quit" | "q" | "exit"] => ShellCommand::Quit,
        ["help" | "?"] => ShellCommand::Help,
        ["undo" | "u"] => ShellCommand::Undo,
        ["redo" | "r"] => ShellCommand::Redo,
        ["history"] => ShellCommand::History,
        ["clear"] => ShellCommand::Clear,
        ["stats"] => ShellCommand::Stats,
        ["list" | "ls", rest @ ..] => ShellCommand::List(rest.join(" ")),
        ["delete" | "rm", id] => ShellCommand::Delete(id.to_string()),
        ["toggle", id] => ShellCommand::Toggle(id.to_string()),
        ["sort", key, rest @ ..] => {
            let key = match key.parse::<SortKey>() {
                Ok(k) => k,
                Err(e) => return ShellCommand::Invalid(e),
            };
            let order = match rest {
                [] => SortOrder::Asc,
                [o] => match o.parse::<SortOrder>() {
                    Ok(o) => o,
                    Err(e) => return ShellCommand::Invalid(e),
                },
                _ => return ShellCommand::Invalid("usage: sort <key> [asc|desc]".into()),
            };
            ShellCommand::Sort(key, order)
        }
        ["add", name, code, region @ ..] if !region.is_empty() => {
            ShellCommand::Add(NewCountry::new(*name, code.to_uppercase(), region.join(" ")))
        }
        ["add", ..] => ShellCommand::Invalid("usage: add <name> <code> <region>".into()),
        ["edit", id, assignments @ ..] if !assignments.is_empty() => {
            let parsed: std::result::Result<Vec<CountryChange>, String> =
                assignments.iter().map(|a| parse_change(a)).collect();
            match parsed {
                Ok(changes) => ShellCommand::Edit {
                    id: id.to_string(),
                    changes,
                },
                Err(e) => ShellCommand::Invalid(e),
            }
        }
        ["edit", ..] => ShellCommand::Invalid("usage: edit <id> <field>=<value>...".into()),
        [other, ..] => ShellCommand::Invalid(format!("unknown command '{other}' (try `help`)")),
    }
}

/// Interactive session over a single store so undo/redo span commands.
pub struct Shell<S: KeyValueStore> {
    store: CountryStore<S>,
    sort_key: SortKey,
    sort_order: SortOrder,
}

impl<S: KeyValueStore> Shell<S> {
    pub fn new(store: CountryStore<S>, sort_key: SortKey, sort_order: SortOrder) -> Self {
        Self {
            store,
            sort_key,
            sort_order,
        }
    }

    /// Read commands until EOF or `quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W, prompt: bool) -> Result<()> {
        if prompt {
            write!(out, "routestamp> ")?;
            out.flush()?;
        }
        for line in input.lines() {
            let line = line?;
            if !self.execute(parse_command(&line), &mut out)? {
                break;
            }
            if prompt {
                write!(out, "routestamp> ")?;
                out.flush()?;
            }
        }
        Ok(())
    }

    /// Run one command. Returns `false` when the session should end.
    pub fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<bool> {
        match command {
            ShellCommand::Empty => {}
            ShellCommand::Quit => return Ok(false),
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Invalid(msg) => writeln!(out, "error: {msg}")?,
            ShellCommand::Add(new) => {
                let name = new.name.clone();
                let id = self.store.add(new);
                writeln!(out, "Added {name} ({id})")?;
            }
            ShellCommand::Edit { id, changes } => {
                if self.store.get(&id).is_none() {
                    writeln!(out, "warning: no country with id {id}")?;
                }
                self.store.edit(&id, changes);
                writeln!(out, "Edited {id}")?;
            }
            ShellCommand::Delete(id) => {
                let name = self.store.get(&id).map(|c| c.name.clone());
                self.store.delete(&id);
                match name {
                    Some(name) => writeln!(out, "Deleted {name}")?,
                    None => writeln!(out, "warning: no country with id {id}")?,
                }
            }
            ShellCommand::Toggle(id) => {
                self.store.toggle_visited(&id);
                match self.store.get(&id) {
                    Some(c) => writeln!(out, "{}: visited = {}", c.name, c.visited)?,
                    None => writeln!(out, "warning: no country with id {id}")?,
                }
            }
            ShellCommand::Undo => {
                if self.store.undo() {
                    writeln!(out, "Undone ({} more)", self.store.undo_depth())?;
                } else {
                    writeln!(out, "Nothing to undo")?;
                }
            }
            ShellCommand::Redo => {
                if self.store.redo() {
                    writeln!(out, "Redone ({} more)", self.store.redo_depth())?;
                } else {
                    writeln!(out, "Nothing to redo")?;
                }
            }
            ShellCommand::List(search) => {
                let filter = CountryFilter {
                    search,
                    ..Default::default()
                };
                let rows = query::filter_and_sort(
                    self.store.countries(),
                    &filter,
                    self.sort_key,
                    self.sort_order,
                );
                if rows.is_empty() {
                    writeln!(out, "No countries.")?;
                }
                for c in &rows {
                    writeln!(out, "{}", crate::format_country_row(c))?;
                }
            }
            ShellCommand::Sort(key, order) => {
                self.sort_key = key;
                self.sort_order = order;
                writeln!(out, "Sort: {} {}", key.label(), order.label())?;
            }
            ShellCommand::History => {
                if self.store.history_len() == 0 {
                    writeln!(out, "History is empty.")?;
                }
                for entry in self.store.history().rev() {
                    writeln!(
                        out,
                        "{}  {:<15} {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.action,
                        entry.describe()
                    )?;
                }
            }
            ShellCommand::Clear => {
                self.store.clear_history();
                writeln!(out, "History cleared.")?;
            }
            ShellCommand::Stats => {
                let stats = self.store.stats();
                writeln!(
                    out,
                    "{} countries, {} visited ({:.0}%), {} wishlist, {} home, {}/{} regions",
                    stats.total,
                    stats.visited,
                    stats.progress_percentage,
                    stats.wishlist,
                    stats.home,
                    stats.regions_visited.len(),
                    stats.regions.len()
                )?;
            }
        }
        Ok(true)
    }
}
