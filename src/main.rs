fn main() {
    if let Err(err) = csv_mare::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
