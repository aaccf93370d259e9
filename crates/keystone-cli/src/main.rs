use std::process::ExitCode;

fn main() -> ExitCode {
    match keystone_cli::run() {
        Ok(code) => code,
        Err(err) => {
            keystone_cli::output::print_error(&err.to_string());
            ExitCode::from(2)
        }
    }
}
