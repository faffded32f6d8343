#[tokio::main]
async fn main() {
    loom_backend::run().await;
}
