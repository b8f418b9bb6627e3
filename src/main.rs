fn main() {
    if let Err(err) = bubble_layout::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
