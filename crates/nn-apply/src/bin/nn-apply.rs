use std::process::ExitCode;

fn main() -> ExitCode {
    nn_apply::cli::cli_main()
}
