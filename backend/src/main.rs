#[tokio::main]
async fn main() -> anyhow::Result<()> {
    food::start_server().await
}
