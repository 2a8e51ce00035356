use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use tj_ridership::present::{Tab, Theme};
use tj_ridership::{parse_month, DateRange};

pub const HELP: &str = "\
Commands:
  range <start> <end>       limit to a date range (YYYY-MM, YYYY-MM-DD or DD/MM/YYYY)
  range all                 restore the full data extent
  routes <a>[,<b>...]       only keep the listed routes
  routes all                clear the route selection
  routes list               show every route in the data
  reset                     clear both the date range and the route selection
  theme dark|light|toggle   switch the theme
  show [overview|trend|routes|recommendations]
  export                    write CSV, chart and map files
  help
  quit";

/// Filter bound from the command line, normalised to its month
pub fn parse_bound(raw: &str) -> Result<NaiveDate> {
    parse_month(raw).with_context(|| format!("Unrecognised date '{raw}', expected YYYY-MM, YYYY-MM-DD or DD/MM/YYYY"))
}

#[derive(Clone, Debug, PartialEq)]
pub enum ThemeChange {
    Set(Theme),
    Toggle,
}

/// One line typed in interactive mode
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Range(Option<DateRange>),
    Routes(Vec<String>),
    ListRoutes,
    Reset,
    Theme(ThemeChange),
    Show(Option<Tab>),
    Export,
    Help,
    Quit,
}

fn parse_tab(raw: &str) -> Result<Tab> {
    Ok(match raw.to_ascii_lowercase().as_str() {
        "overview" | "kpi" => Tab::Overview,
        "trend" | "distribution" => Tab::TrendDistribution,
        "routes" | "spatial" | "map" => Tab::RoutesSpatial,
        "recommendations" => Tab::Recommendations,
        other => bail!("Unknown tab '{other}'"),
    })
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match verb.to_ascii_lowercase().as_str() {
            "range" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
                ["all"] | [] => Command::Range(None),
                [start, end] => Command::Range(Some(DateRange::new(parse_bound(start)?, parse_bound(end)?))),
                _ => bail!("Usage: range <start> <end> | range all"),
            },
            "routes" | "route" => {
                if rest.is_empty() || rest.eq_ignore_ascii_case("all") {
                    Command::Routes(Vec::new())
                } else if rest.eq_ignore_ascii_case("list") {
                    Command::ListRoutes
                } else {
                    let separator = if rest.contains(',') { ',' } else { ' ' };
                    Command::Routes(
                        rest.split(separator)
                            .map(str::trim)
                            .filter(|r| !r.is_empty())
                            .map(str::to_string)
                            .collect(),
                    )
                }
            }
            "theme" => match rest {
                "" | "toggle" => Command::Theme(ThemeChange::Toggle),
                name => Command::Theme(ThemeChange::Set(
                    name.parse().map_err(|_| anyhow!("Unknown theme '{name}', expected dark or light"))?,
                )),
            },
            "show" => match rest {
                "" | "all" => Command::Show(None),
                tab => Command::Show(Some(parse_tab(tab)?)),
            },
            "export" => Command::Export,
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => bail!("Empty command"),
            other => bail!("Unknown command '{other}', type 'help' for a list"),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_parse_bound_formats() {
        assert_eq!(parse_bound("2021-03").unwrap(), date(2021, 3));
        assert_eq!(parse_bound("2021-03-17").unwrap(), date(2021, 3));
        assert_eq!(parse_bound("17/03/2021").unwrap(), date(2021, 3));
        assert!(parse_bound("March").is_err());
    }

    #[test]
    fn test_range_commands() {
        assert_eq!(
            "range 2021-03 2021-06".parse::<Command>().unwrap(),
            Command::Range(Some(DateRange::new(date(2021, 3), date(2021, 6))))
        );
        assert_eq!("range all".parse::<Command>().unwrap(), Command::Range(None));
        assert!("range 2021-03".parse::<Command>().is_err());
    }

    #[test]
    fn test_route_commands() {
        assert_eq!(
            "routes 1, 9A ,13".parse::<Command>().unwrap(),
            Command::Routes(vec!["1".into(), "9A".into(), "13".into()])
        );
        assert_eq!(
            "routes 1 2".parse::<Command>().unwrap(),
            Command::Routes(vec!["1".into(), "2".into()])
        );
        assert_eq!("routes all".parse::<Command>().unwrap(), Command::Routes(Vec::new()));
        assert_eq!("routes list".parse::<Command>().unwrap(), Command::ListRoutes);
    }

    #[test]
    fn test_theme_and_show() {
        assert_eq!("theme".parse::<Command>().unwrap(), Command::Theme(ThemeChange::Toggle));
        assert_eq!(
            "theme light".parse::<Command>().unwrap(),
            Command::Theme(ThemeChange::Set(Theme::Light))
        );
        assert!("theme sepia".parse::<Command>().is_err());
        assert_eq!("show map".parse::<Command>().unwrap(), Command::Show(Some(Tab::RoutesSpatial)));
        assert_eq!("show".parse::<Command>().unwrap(), Command::Show(None));
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!("  QUIT ".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("export".parse::<Command>().unwrap(), Command::Export);
        assert_eq!("reset".parse::<Command>().unwrap(), Command::Reset);
        assert!("".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
    }
}
