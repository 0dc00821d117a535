//! Driver: project the CPU effect of region scenarios over the embedded
//! application profiles and print a report.

use anyhow::Context;
use clap::{Arg, Command};
use log::debug;
use regex::Regex;

use region_eval::model::cost::project;
use region_eval::model::profile::APP_PROFILES;
use region_eval::model::scenario::SCENARIOS;
use region_eval::model::vary::SweepProgram;
use region_eval::report::{self, OutputFormat};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let matches = Command::new("region-eval")
        .about("Project the CPU effect of region-based memory management scenarios")
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .default_value("text")
                .help("output format (text or tsv)"),
        )
        .arg(
            Arg::new("app")
                .long("app")
                .value_name("REGEXP")
                .default_value(".*")
                .help("application name regexp"),
        )
        .arg(
            Arg::new("scenario")
                .long("scenario")
                .value_name("REGEXP")
                .default_value(".*")
                .help("scenario name regexp"),
        )
        .arg(
            Arg::new("vary")
                .long("vary")
                .value_name("PROGRAM")
                .default_value("")
                .help("sweep program <name>=[<lo>:<hi>](,<name>=[<lo>:<hi>])*/<steps>"),
        )
        .get_matches();

    let format: OutputFormat = matches.get_one::<String>("format").unwrap().parse()?;
    let app_re = anchored(matches.get_one::<String>("app").unwrap())
        .context("parsing application regexp")?;
    let scenario_re = anchored(matches.get_one::<String>("scenario").unwrap())
        .context("parsing scenario regexp")?;
    let sweep = match matches.get_one::<String>("vary").unwrap().as_str() {
        "" => None,
        program => Some(program.parse::<SweepProgram>()?),
    };

    let mut rows = vec![report::header()];
    for app in APP_PROFILES {
        if !app_re.is_match(app.name) {
            continue;
        }
        for scenario in SCENARIOS {
            if !scenario_re.is_match(scenario.name) {
                continue;
            }
            match &sweep {
                Some(program) => {
                    for swept in program.scenarios(*scenario) {
                        rows.push(report::record(app, &swept, &project(app, &swept)));
                    }
                }
                None => rows.push(report::record(app, scenario, &project(app, scenario))),
            }
        }
    }
    debug!("emitting {} rows as {:?}", rows.len() - 1, format);
    print!("{}", report::render(format, &rows));
    Ok(())
}

/// Name filters match whole names, not substrings.
fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}
