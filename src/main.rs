fn main() {
    if let Err(e) = cafe_desk_lib::run() {
        eprintln!("cafe-desk: {e}");
        std::process::exit(1);
    }
}
