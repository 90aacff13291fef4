fn main() {
    if let Err(err) = fan_chart::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
