//! Application definition.

extern crate simplelog;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Error, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use tunefish_core::{
    DriverSettings, ExperimentDriver, OptimizerLauncher, OverlayConfig, ResultArtifact, RunSpec,
    Scorer, SeriesTailScorer, StaticConfig,
};

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

const DEFAULT_SETTINGS_PATH: &str = "./tunefish.toml";

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("tunefish-cli")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .version(VERSION)
        .about("Run and score calibration experiments against an external \
                simulation, and hand whole experiments to an external optimizer.")
        .arg(Arg::with_name("verbosity")
            .long("verbosity")
            .short("v")
            .takes_value(true)
            .default_value("info")
            .value_name("verb")
            .global(true)
            .help("Set the verbosity of the log output"))

        // run subcommand
        .subcommand(SubCommand::with_name("run")
            .display_order(10)
            .about("Run a single experiment and print its score")
            .arg(Arg::with_name("settings")
                .long("settings")
                .short("s")
                .takes_value(true)
                .value_name("path")
                .default_value(DEFAULT_SETTINGS_PATH)
                .help("Path to the driver settings manifest"))
            .arg(Arg::with_name("template")
                .long("template")
                .short("t")
                .required(true)
                .takes_value(true)
                .value_name("path")
                .help("Path to the configuration template for this run"))
            .arg(Arg::with_name("title")
                .long("title")
                .required(true)
                .takes_value(true)
                .value_name("name")
                .help("Run title, names the configuration file and the output directory"))
            .arg(Arg::with_name("years")
                .long("years")
                .takes_value(true)
                .value_name("n")
                .default_value("20")
                .help("Number of years to simulate"))
            .arg(Arg::with_name("data")
                .long("data")
                .help("Ask the simulation to collect additional data"))
            .arg(Arg::with_name("policy")
                .long("policy")
                .takes_value(true)
                .value_name("path")
                .help("Policy script passed through to the simulation"))
            .arg(Arg::with_name("set")
                .long("set")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .value_name("key=value")
                .help("Override a template value at a dotted key path, \
                       e.g. --set \"gear.catchability=0.2\""))
            .arg(Arg::with_name("group")
                .long("group")
                .takes_value(true)
                .value_name("name")
                .default_value(tunefish_core::DEFAULT_SERIES_GROUP)
                .help("Result group the scored column lives in"))
            .arg(Arg::with_name("column")
                .long("column")
                .takes_value(true)
                .value_name("name")
                .default_value(tunefish_core::DEFAULT_SERIES_COLUMN)
                .help("Column whose final value is scored")))

        // score subcommand
        .subcommand(SubCommand::with_name("score")
            .display_order(11)
            .about("Score an existing result artifact without running anything")
            .arg(Arg::with_name("path")
                .required(true)
                .value_name("result-path")
                .help("Path to the result artifact (result.yaml)"))
            .arg(Arg::with_name("group")
                .long("group")
                .takes_value(true)
                .value_name("name")
                .default_value(tunefish_core::DEFAULT_SERIES_GROUP))
            .arg(Arg::with_name("column")
                .long("column")
                .takes_value(true)
                .value_name("name")
                .default_value(tunefish_core::DEFAULT_SERIES_COLUMN)))

        // optimize subcommand
        .subcommand(SubCommand::with_name("optimize")
            .display_order(20)
            .about("Launch the external optimizer over an experiment directory")
            .long_about("Launch the external optimizer over an experiment directory.\n\n\
                The directory must contain a config.json descriptor with at least \n\
                an \"experiment-name\" field; everything else inside it belongs \n\
                to the optimizer.")
            .arg(Arg::with_name("dir")
                .required(true)
                .value_name("experiment-dir")
                .help("Experiment directory handed to the optimizer"))
            .arg(Arg::with_name("settings")
                .long("settings")
                .short("s")
                .takes_value(true)
                .value_name("path")
                .default_value(DEFAULT_SETTINGS_PATH)
                .help("Path to the driver settings manifest")))
}

/// Runs based on specified subcommand.
pub fn start(matches: ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("run", Some(m)) => start_run(m),
        ("score", Some(m)) => start_score(m),
        ("optimize", Some(m)) => start_optimize(m),
        _ => Ok(()),
    }
}

fn start_run(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);

    let settings = load_settings(matches)?;
    let template = PathBuf::from(matches.value_of("template").unwrap());
    let title = matches.value_of("title").unwrap();
    let years: u32 = matches
        .value_of("years")
        .unwrap()
        .parse()
        .map_err(|_| Error::msg("years must be a positive integer"))?;

    let mut spec = RunSpec::new(title, years);
    spec.collect_data = matches.is_present("data");
    spec.policy = matches.value_of("policy").map(PathBuf::from);

    let scorer = SeriesTailScorer::new(
        matches.value_of("group").unwrap(),
        matches.value_of("column").unwrap(),
    );

    let driver = ExperimentDriver::new(settings);
    let report = match matches.values_of("set") {
        Some(pairs) => {
            let mut writer = OverlayConfig::from_template(&template)?;
            for pair in pairs {
                let (key, value) = parse_override(pair)?;
                writer = writer.set(key, value);
            }
            driver.run(&writer, &scorer, &spec)?
        }
        None => {
            let writer = StaticConfig::from_template(&template)?;
            driver.run(&writer, &scorer, &spec)?
        }
    };

    println!(
        "run \"{}\" finished in {:.1}s, score: {}",
        report.title,
        report.elapsed.as_secs_f64(),
        report.score
    );
    Ok(())
}

fn start_score(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);

    let path = PathBuf::from(matches.value_of("path").unwrap());
    let artifact = ResultArtifact::load(&path)?;
    let scorer = SeriesTailScorer::new(
        matches.value_of("group").unwrap(),
        matches.value_of("column").unwrap(),
    );
    println!("score: {}", scorer.score(&artifact)?);
    Ok(())
}

fn start_optimize(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);

    let settings = load_settings(matches)?;
    let mut dir = PathBuf::from(matches.value_of("dir").unwrap());
    if dir.is_relative() {
        dir = env::current_dir()?.join(dir);
    }
    dir = dir.canonicalize().unwrap_or(dir);

    let launcher = OptimizerLauncher::new(settings.optimizer.clone());
    let manifest = launcher.launch(&dir)?;
    println!("optimizer finished for \"{}\"", manifest.experiment_name);
    Ok(())
}

fn load_settings(matches: &ArgMatches) -> Result<DriverSettings> {
    let path = matches.value_of("settings").unwrap();
    debug!("loading driver settings at: {}", path);
    let settings = DriverSettings::from_path(Path::new(path))?;
    Ok(settings)
}

/// Splits a `key=value` pair, parsing the value as a yaml scalar so numbers
/// and booleans come out typed.
fn parse_override(pair: &str) -> Result<(String, serde_yaml::Value)> {
    let mut parts = pair.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(key), Some(value)) if !key.is_empty() => {
            let value = serde_yaml::from_str(value)?;
            Ok((key.to_string(), value))
        }
        _ => Err(Error::msg(format!(
            "override must be of the form key=value: \"{}\"",
            pair
        ))),
    }
}

fn setup_log_verbosity(matches: &ArgMatches) {
    use self::simplelog::{LevelFilter, TermLogger};
    let level_filter = match matches.value_of("verbosity") {
        Some(s) => match s {
            "0" | "none" => LevelFilter::Off,
            "1" | "err" | "error" | "min" => LevelFilter::Error,
            "2" | "warn" | "warning" => LevelFilter::Warn,
            "3" | "info" | "default" => LevelFilter::Info,
            "4" | "debug" => LevelFilter::Debug,
            "5" | "trace" | "max" | "all" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        },
        _ => LevelFilter::Info,
    };
    let mut config_builder = simplelog::ConfigBuilder::new();
    let logger_conf = config_builder
        .set_time_level(LevelFilter::Error)
        .set_target_level(LevelFilter::Debug)
        .set_location_level(LevelFilter::Error)
        .set_time_format_str("%H:%M:%S%.6f")
        .build();
    TermLogger::init(level_filter, logger_conf, simplelog::TerminalMode::Mixed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_pairs_come_out_typed() {
        let (key, value) = parse_override("gear.catchability=0.2").unwrap();
        assert_eq!(key, "gear.catchability");
        assert_eq!(value.as_f64(), Some(0.2));

        let (_, value) = parse_override("regulation.enabled=true").unwrap();
        assert_eq!(value.as_bool(), Some(true));

        let (_, value) = parse_override("ports.home=Monterey").unwrap();
        assert_eq!(value.as_str(), Some("Monterey"));
    }

    #[test]
    fn override_value_may_contain_equals() {
        let (key, value) = parse_override("note=a=b").unwrap();
        assert_eq!(key, "note");
        assert_eq!(value.as_str(), Some("a=b"));
    }

    #[test]
    fn bare_override_is_rejected() {
        assert!(parse_override("catchability").is_err());
        assert!(parse_override("=0.2").is_err());
    }

    #[test]
    fn app_accepts_a_full_run_invocation() {
        let matches = app().get_matches_from(vec![
            "tunefish", "run", "--template", "scenario.yaml", "--title", "baseline", "--years",
            "50", "--data", "--set", "gear.catchability=0.2", "--set", "biology.k=5000",
        ]);
        let m = matches.subcommand_matches("run").unwrap();
        assert_eq!(m.value_of("years"), Some("50"));
        assert!(m.is_present("data"));
        let overrides: Vec<_> = m.values_of("set").unwrap().collect();
        assert_eq!(overrides, vec!["gear.catchability=0.2", "biology.k=5000"]);
    }
}
