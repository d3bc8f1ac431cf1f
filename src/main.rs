fn main() {
    if let Err(err) = procflow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
