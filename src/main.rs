fn main() {
    if let Err(err) = vdats_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
