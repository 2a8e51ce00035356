use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod commands;

use commands::{parse_bound, Command, ThemeChange, HELP};
use tj_ridership::present::{Report, Session, Theme};
use tj_ridership::{AnalysisConfig, Dataset, DatasetCache, DateRange, RidershipError, ViewFilter};

#[derive(Parser, Debug)]
#[command(
    name = "ridership-dashboard",
    author,
    version,
    about = "TransJakarta 2021 ridership dashboard",
    long_about = "Loads the TransJakarta 2021 trip table and renders KPIs, monthly trend, \
                  ridership distribution, route and stop rankings, distance correlation \
                  and hotspot density.\n\n\
                  Every view can be exported as CSV, alongside chart payloads (JSON) and \
                  hotspot map layers (GeoJSON) for an external renderer."
)]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Trip table (CSV)
    #[arg(short, long, global = true, default_value = "df_final.csv")]
    input: PathBuf,

    /// First month to include (YYYY-MM, YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long, global = true)]
    start: Option<String>,

    /// Last month to include, inclusive
    #[arg(long, global = true)]
    end: Option<String>,

    /// Only include this route (repeatable)
    #[arg(short, long = "route", global = true)]
    routes: Vec<String>,

    /// Colour theme for charts and map
    #[arg(long, global = true, default_value = "dark")]
    theme: Theme,

    /// Directory for CSV, chart and map exports
    #[arg(short, long, global = true, default_value = "exports")]
    out_dir: PathBuf,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Render every view once and write the exports
    Report {
        /// Print the dashboard without writing export files
        #[arg(long)]
        no_export: bool,
    },
    /// Read filter and theme commands from stdin, re-rendering after each one
    Interactive,
}

/// Load through the cache, reporting a missing table instead of failing
fn load(cache: &mut DatasetCache, input: &Path) -> Result<Option<Arc<Dataset>>> {
    match cache.load(input) {
        Ok(dataset) => Ok(Some(dataset)),
        Err(err @ RidershipError::SourceNotFound(_)) => {
            log::error!("{err}");
            log::error!("Nothing to render without the trip table; pass --input <file>");
            Ok(None)
        }
        Err(err) => Err(err).with_context(|| format!("Failed to load {}", input.display())),
    }
}

/// Filter from the command-line flags. A missing bound falls back to the
/// data extent; with no extent to fall back on, the range stays open.
fn initial_filter(args: &Args, extent: Option<DateRange>) -> Result<ViewFilter> {
    let start = args.start.as_deref().map(parse_bound).transpose()?;
    let end = args.end.as_deref().map(parse_bound).transpose()?;
    let range = start
        .or(extent.map(|e| e.start))
        .zip(end.or(extent.map(|e| e.end)))
        .map(|(start, end)| DateRange::new(start, end))
        .filter(|_| start.is_some() || end.is_some());

    Ok(ViewFilter::default()
        .with_range(range)
        .with_routes(args.routes.iter().map(String::as_str)))
}

/// Session seeded from the command-line flags
fn initial_session(args: &Args, dataset: &Dataset) -> Result<Session> {
    let mut session = Session::new(AnalysisConfig::default());
    session.set_theme(args.theme);
    session.set_filter(initial_filter(args, dataset.extent())?);
    Ok(session)
}

fn export(report: &Report<'_>, out_dir: &Path) -> Result<()> {
    let mut written = report
        .write_exports(out_dir)
        .with_context(|| format!("Failed to write exports to {}", out_dir.display()))?;
    written.extend(
        report
            .write_payloads(out_dir)
            .with_context(|| format!("Failed to write chart payloads to {}", out_dir.display()))?,
    );
    for path in &written {
        log::info!("  {}", path.display());
    }
    Ok(())
}

fn run_report(args: &Args, dataset: &Dataset, no_export: bool) -> Result<()> {
    let session = initial_session(args, dataset)?;
    let report = session.render(dataset);
    println!("{}", report.render_text());

    if !no_export {
        export(&report, &args.out_dir)?;
    }
    Ok(())
}

fn run_interactive(args: &Args, cache: &mut DatasetCache) -> Result<()> {
    let Some(dataset) = load(cache, &args.input)? else {
        return Ok(());
    };
    let mut session = initial_session(args, &dataset)?;
    println!("{}", session.render(&dataset).render_text());
    println!("{HELP}");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match &command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::ListRoutes => {
                let routes: Vec<&str> = dataset.routes().iter().map(|r| r.as_str()).collect();
                println!("{} routes: {}", routes.len(), routes.join(", "));
                continue;
            }
            Command::Reset => session.clear_filter(),
            Command::Range(range) => session.set_range(*range),
            Command::Routes(routes) => session.set_routes(routes.iter().map(String::as_str)),
            Command::Theme(ThemeChange::Toggle) => {
                session.toggle_theme();
            }
            Command::Theme(ThemeChange::Set(theme)) => session.set_theme(*theme),
            Command::Show(_) | Command::Export => {}
        }

        // Every interaction is a fresh pass over the cached table
        let Some(dataset) = load(cache, &args.input)? else {
            return Ok(());
        };
        let report = session.render(&dataset);
        match command {
            Command::Show(Some(tab)) => println!("{}", report.render_tab(tab)),
            Command::Export => export(&report, &args.out_dir)?,
            _ => println!("{}", report.render_text()),
        }
        stdout.flush()?;
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== TransJakarta 2021 Ridership Dashboard ===");
    log::info!("Input: {}", args.input.display());

    let mut cache = DatasetCache::new();
    match &args.mode {
        Mode::Report { no_export } => {
            let Some(dataset) = load(&mut cache, &args.input)? else {
                return Ok(());
            };
            run_report(&args, &dataset, *no_export)
        }
        Mode::Interactive => run_interactive(&args, &mut cache),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn month(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, m, 1).unwrap()
    }

    fn args(flags: &[&str]) -> Args {
        let mut argv = vec!["ridership-dashboard"];
        argv.extend_from_slice(flags);
        argv.push("report");
        Args::try_parse_from(argv).unwrap()
    }

    fn extent() -> Option<DateRange> {
        Some(DateRange::new(month(1), month(12)))
    }

    #[test]
    fn test_no_bounds_leave_range_open() {
        let filter = initial_filter(&args(&[]), extent()).unwrap();
        assert_eq!(filter, ViewFilter::default());
    }

    #[test]
    fn test_start_alone_runs_to_last_month() {
        let filter = initial_filter(&args(&["--start", "2021-03"]), extent()).unwrap();
        assert_eq!(filter.range, Some(DateRange::new(month(3), month(12))));
    }

    #[test]
    fn test_end_alone_starts_at_first_month() {
        let filter = initial_filter(&args(&["--end", "15/06/2021"]), extent()).unwrap();
        assert_eq!(filter.range, Some(DateRange::new(month(1), month(6))));
    }

    #[test]
    fn test_bounds_without_extent() {
        let filter = initial_filter(&args(&["--start", "2021-03"]), None).unwrap();
        assert_eq!(filter.range, None);

        let filter = initial_filter(&args(&["--start", "2021-03", "--end", "2021-05"]), None).unwrap();
        assert_eq!(filter.range, Some(DateRange::new(month(3), month(5))));
    }

    #[test]
    fn test_routes_and_bad_bound() {
        let filter = initial_filter(&args(&["-r", "1", "--route", "9A"]), extent()).unwrap();
        let routes: Vec<_> = filter.routes.iter().map(|r| r.as_str()).collect();
        assert_eq!(routes, vec!["1", "9A"]);

        assert!(initial_filter(&args(&["--start", "March"]), extent()).is_err());
    }
}
