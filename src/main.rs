#[tokio::main]
async fn main() {
    relief_profile::start_server().await;
}
