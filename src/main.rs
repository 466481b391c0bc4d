fn main() {
    env_logger::init();
    log::info!("Chess Match - Terminal");
    chess_match::terminal::run_interactive_terminal();
}
