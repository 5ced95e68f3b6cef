use std::process::ExitCode;

use rule_sorter::logging::init_tracing;
use rule_sorter::{run_and_report, RunLog, Settings};

fn main() -> ExitCode {
    init_tracing();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut log = match RunLog::open(settings.log_path()) {
        Ok(log) => log,
        Err(e) => {
            // Keep going; events still reach the console
            eprintln!("{}", e);
            RunLog::in_memory()
        }
    };

    tracing::info!(
        rules = %settings.rules_file.display(),
        target = %settings.target_dir.display(),
        "Starting run"
    );

    let code = run_and_report(settings, &mut log);
    log.close();
    code
}
