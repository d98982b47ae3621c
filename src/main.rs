fn main() {
    if let Err(e) = chainstate_dump::cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
