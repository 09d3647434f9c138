use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(e) = rental_backend::run().await {
        error!("Server stopped: {}", e);
        eprintln!("rental-backend: {}", e);
        std::process::exit(1);
    }
}
