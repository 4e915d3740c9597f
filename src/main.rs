mod state;

use crate::state::app_settings::AppSettings;
use crate::state::messages::{PageRequest, PageResponse};
use crate::state::network::PageLoader;
use crate::state::plan::Plan;
use chrono::{NaiveDate, Utc};
use env_logger::Env;
use log::{debug, error};
use pitchiq_api::news::ALL_LEAGUES;
use tokio::sync::mpsc;

#[derive(Debug, PartialEq)]
enum Cli {
    Help,
    Version,
    Page(PageRequest),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    better_panic::install();

    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Ignoring unreadable .env file: {e}");
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = AppSettings::load();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = match parse_args(&args, settings.default_user.as_deref()) {
        Ok(Cli::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(Cli::Version) => {
            println!("pitchiq {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(Cli::Page(request)) => request,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    let (request_tx, request_rx) = mpsc::channel::<PageRequest>(1);
    let (response_tx, mut response_rx) = mpsc::channel::<PageResponse>(1);

    // Page loader task
    let loader_task = tokio::spawn(PageLoader::new(&settings).run(request_rx, response_tx));

    debug!("sending {request:?}");
    request_tx.send(request).await?;
    drop(request_tx);

    let Some(response) = response_rx.recv().await else {
        anyhow::bail!("page loader stopped without answering");
    };
    loader_task.await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.is_error() {
        error!("request did not produce a page");
        std::process::exit(1);
    }
    Ok(())
}

fn parse_args(args: &[String], default_user: Option<&str>) -> Result<Cli, String> {
    let mut user = default_user.map(str::to_owned);
    let mut compare = false;
    let mut positional: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Cli::Help),
            "-V" | "--version" => return Ok(Cli::Version),
            "--user" | "-u" => {
                let value = iter.next().ok_or("--user needs a value")?;
                user = Some(value.clone());
            }
            "--compare" => compare = true,
            flag if flag.starts_with('-') => return Err(format!("Unknown argument: {flag}")),
            other => positional.push(other),
        }
    }

    let Some((&command, rest)) = positional.split_first() else {
        return Ok(Cli::Help);
    };
    let arg = |i: usize, name: &str| -> Result<String, String> {
        rest.get(i)
            .map(|s| (*s).to_owned())
            .ok_or_else(|| format!("{command}: missing <{name}>"))
    };
    let text = || -> Result<String, String> {
        let joined = rest.join(" ");
        if joined.trim().is_empty() {
            return Err(format!("{command}: missing search text"));
        }
        Ok(joined)
    };
    let need_user = || user.clone().ok_or_else(|| format!("{command}: needs --user or PITCHIQ_USER"));

    let request = match command {
        "leagues" => PageRequest::Leagues,
        "seasons" => PageRequest::Seasons,
        "league" => PageRequest::League { id: arg(0, "league-id")? },
        "standings" => PageRequest::Standings {
            league: arg(0, "league-id")?,
            season: arg(1, "season")?,
            previous: compare,
        },
        "team" => PageRequest::Team { id: arg(0, "team-id")? },
        "team-search" => PageRequest::TeamByName { name: text()? },
        "player" => PageRequest::Player { id: arg(0, "player-id")?, user: user.clone() },
        "players" => PageRequest::PlayerSearch { query: text()? },
        "match" => PageRequest::Match { id: arg(0, "event-id")?, user: user.clone() },
        "fixtures" => {
            let date = match rest.first() {
                Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|e| format!("fixtures: bad date {raw:?}: {e}"))?,
                None => Utc::now().date_naive(),
            };
            let league = (rest.len() > 1).then(|| rest[1..].join(" "));
            PageRequest::FixturesByDate { date, league }
        }
        "round" => PageRequest::FixturesByRound {
            league: arg(0, "league-id")?,
            season: arg(1, "season")?,
            round: arg(2, "round")?,
        },
        "news" => PageRequest::News {
            league: rest.first().map_or(ALL_LEAGUES, |s| *s).to_owned(),
        },
        "plan" => PageRequest::Plan { user: need_user()? },
        "upgrade" => PageRequest::SetPlan { user: need_user()?, plan: Plan::Pro },
        "downgrade" => PageRequest::SetPlan { user: need_user()?, plan: Plan::Free },
        other => return Err(format!("Unknown command: {other}")),
    };
    Ok(Cli::Page(request))
}

fn usage_text() -> &'static str {
    "pitchiq - soccer statistics from TheSportsDB

Usage:
  pitchiq leagues
  pitchiq seasons
  pitchiq league <league-id>
  pitchiq standings <league-id> <season> [--compare]
  pitchiq team <team-id>
  pitchiq team-search <name>
  pitchiq player <player-id>
  pitchiq players <name>
  pitchiq match <event-id>
  pitchiq fixtures [YYYY-MM-DD] [league name]
  pitchiq round <league-id> <season> <round>
  pitchiq news [eng.1|esp.1|ita.1|ger.1|fra.1|uefa.champions|uefa.europa|all]
  pitchiq plan | upgrade | downgrade
  pitchiq --help
  pitchiq --version

Options:
  -u, --user <id>   User whose plan gates premium widgets (default PITCHIQ_USER)

Environment:
  THESPORTSDB_API_KEY     Provider API key (required for provider data)
  THESPORTSDB_BASE_URL    Provider base URL
  PITCHIQ_NEWS_BASE_URL   News API base URL
  PITCHIQ_AI_URL          Ollama-compatible AI service (enables insights and shot maps)
  PITCHIQ_AI_MODEL        AI model (default gemma3:1b)
  PITCHIQ_AI_KEY          Bearer token for the AI service
  PITCHIQ_DATA_DIR        Plan document directory (default ./data)
  PITCHIQ_USER            Default user
  RUST_LOG                Log filter (default info)"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, String> {
        let args: Vec<String> = args.iter().map(|s| (*s).to_owned()).collect();
        parse_args(&args, None)
    }

    #[test]
    fn flags_and_empty_args() {
        assert_eq!(parse(&[]), Ok(Cli::Help));
        assert_eq!(parse(&["--version"]), Ok(Cli::Version));
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["transfer"]).is_err());
    }

    #[test]
    fn standings_compare_flag() {
        assert_eq!(
            parse(&["standings", "4328", "2023-2024", "--compare"]),
            Ok(Cli::Page(PageRequest::Standings {
                league: "4328".into(),
                season: "2023-2024".into(),
                previous: true,
            }))
        );
        assert!(parse(&["standings", "4328"]).is_err());
    }

    #[test]
    fn user_comes_from_flag_or_default() {
        assert_eq!(
            parse(&["match", "1", "--user", "alice"]),
            Ok(Cli::Page(PageRequest::Match { id: "1".into(), user: Some("alice".into()) }))
        );
        let args = vec!["upgrade".to_owned()];
        assert_eq!(
            parse_args(&args, Some("bob")),
            Ok(Cli::Page(PageRequest::SetPlan { user: "bob".into(), plan: Plan::Pro }))
        );
        assert!(parse(&["plan"]).is_err());
    }

    #[test]
    fn search_text_is_joined() {
        assert_eq!(
            parse(&["team-search", "Manchester", "United"]),
            Ok(Cli::Page(PageRequest::TeamByName { name: "Manchester United".into() }))
        );
        assert!(parse(&["players"]).is_err());
    }

    #[test]
    fn fixtures_date_and_league() {
        assert_eq!(
            parse(&["fixtures", "2024-05-19", "Spanish", "La", "Liga"]),
            Ok(Cli::Page(PageRequest::FixturesByDate {
                date: NaiveDate::from_ymd_opt(2024, 5, 19).unwrap(),
                league: Some("Spanish La Liga".into()),
            }))
        );
        assert!(parse(&["fixtures", "19/05/2024"]).is_err());
        assert_eq!(
            parse(&["news"]),
            Ok(Cli::Page(PageRequest::News { league: "all".into() }))
        );
    }
}
