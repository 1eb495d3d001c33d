#[tokio::main]
async fn main() {
    if let Err(e) = medilens_lib::run().await {
        tracing::error!("MediLens failed to start: {e}");
        eprintln!("medilens: {e}");
        std::process::exit(1);
    }
}
