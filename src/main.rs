use std::process;

use anyhow::Context;
use tracing::debug;

use ansh::cli::{self, CliArgs};
use ansh::config::{Config, ConfigLoader};
use ansh::environment::Environment;
use ansh::executor::ProcessLauncher;
use ansh::io::InputSource;
use ansh::logging;
use ansh::prompt::ShellPrompt;
use ansh::repl::Shell;

/// Fixed diagnostic for a batch script that cannot be used.
const BATCH_FAILURE: &str = "An error has occurred";

fn main() {
    match run_main() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("ansh: {err:#}");
            process::exit(1);
        }
    }
}

fn run_main() -> anyhow::Result<i32> {
    let args = cli::parse();
    logging::init_logging(args.debug, args.log_level)?;
    debug!(?args, "starting");

    let config = load_config(&args)?;

    let mut input = match &args.script {
        None => InputSource::interactive(config.max_line_len),
        Some(script) => match InputSource::open_batch(script, config.max_line_len) {
            Ok(input) => input,
            Err(err) => {
                debug!(%err, "batch script unusable");
                eprintln!("{BATCH_FAILURE}");
                return Ok(1);
            }
        },
    };

    let env = Environment::with_search_path(config.initial_search_path());
    let mut shell =
        Shell::new(env, ProcessLauncher::new()).with_prompt(ShellPrompt::from_config(&config));

    Ok(shell.run(&mut input)?)
}

fn load_config(args: &CliArgs) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(ConfigLoader::default_config()),
    }
}
