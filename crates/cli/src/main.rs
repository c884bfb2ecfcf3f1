use std::process::ExitCode;

fn main() -> ExitCode {
    ratebot_cli::run()
}
