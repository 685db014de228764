//! gpulive: live NVIDIA GPU dashboard
//!
//! Takes no arguments. Runs until Ctrl+C (or `q`), then prints a confirmation and exits 0.
//! Any terminal failure tears the dashboard down and exits 1.

fn main() {
    env_logger::init();

    match gpulive::tui::run() {
        Ok(()) => println!("\n{}", gpulive::tui::stopped_message()),
        Err(e) => {
            eprintln!("\nAn unexpected error occurred: {}", e);
            std::process::exit(1);
        }
    }
}
