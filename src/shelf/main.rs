mod cli;

fn main() {
    if let Err(e) = cli::run() {
        let kind = e.kind();
        eprintln!("Error [{}]: {}", kind, e);
        std::process::exit(kind.exit_code());
    }
}
