fn main() {
    if let Err(err) = rectangulator::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
