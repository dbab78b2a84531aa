use log::error;
use shopfront::cli::Cli;

fn main() {
    // Logging is configured from the loaded config inside handle_command_line.
    // RUST_LOG overrides it: ERROR → WARN → INFO → DEBUG → TRACE
    if let Err(err) = Cli::handle_command_line() {
        error!("{:?}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
