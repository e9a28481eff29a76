use std::{env, io};

use cli::{default_log_level, parse_args, report_failure, run, Invocation, LOG_ENV, USAGE};
use common::settings::Settings;

fn main() {
    let matches = match parse_args(env::args_os()) {
        Invocation::Run(matches) => matches,
        Invocation::Display(err) => err.exit(),
        Invocation::Usage => {
            println!("{}\n", USAGE);
            std::process::exit(1);
        }
    };

    let settings = match Settings::new(matches.get_one::<String>("config")) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Could not load config: {:?}", err);
            std::process::exit(1);
        }
    };

    let level = default_log_level(
        matches.get_count("verbosity"),
        settings.logging().verbosity(),
    );
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, level))
        .format_module_path(false)
        .format_timestamp(None)
        .init();

    if let Err(err) = run(&matches, &settings, &mut io::stdout()) {
        report_failure(&mut io::stderr(), &err);
        std::process::exit(1);
    }
}
