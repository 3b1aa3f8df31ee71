//! Register binary entry point.

#[tokio::main]
async fn main() {
    if let Err(e) = vega_terminal::run().await {
        eprintln!("Terminal failed: {e}");
        std::process::exit(1);
    }
}
