use std::process::ExitCode;

fn main() -> ExitCode {
    match fileqd::run_service() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("fileqd: {error}");
            ExitCode::FAILURE
        }
    }
}
