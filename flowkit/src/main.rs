use flowkit_tracing::println_red_err;

fn main() {
    if let Err(err) = flowkit::cli::run_cli() {
        println_red_err(&format!("Error: {err:?}"));
        std::process::exit(1);
    }
}
