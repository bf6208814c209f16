#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lexis_backend::run().await
}
