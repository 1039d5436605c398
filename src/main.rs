use rookie::console::Console;

fn main() {
    env_logger::init();
    println!("rookie v{}, by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));

    let perft_mode = std::env::args().nth(1).as_deref() == Some("perft");

    // Launches a perft test
    if perft_mode {
        let expected_format = "Expected : perft <depth> [<FEN>]";
        let depth = match std::env::args().nth(2).and_then(|d| d.parse::<u32>().ok()) {
            Some(d) => d,
            None => {
                eprintln!("{}", expected_format);
                std::process::exit(2);
            }
        };
        let fen = std::env::args().nth(3);

        if let Err(e) = rookie::run_perft(depth, fen) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    } else {
        Console::default().run()
    }
}
