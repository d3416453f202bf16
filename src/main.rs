#[tokio::main]
async fn main() {
    modhost::app::startup::startup().await;
}
