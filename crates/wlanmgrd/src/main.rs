use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match wlanmgrd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // Telemetry may not be installed yet, so report directly.
            writeln!(io::stderr(), "wlanmgrd: {error}").ok();
            ExitCode::FAILURE
        }
    }
}
