use bmk::cli::exit_codes::exit_code_for;
use bmk::ui::output;

fn main() -> std::process::ExitCode {
    match bmk::cli::run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            let code = exit_code_for(&err);
            std::process::ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
