#[tokio::main]
async fn main() -> anyhow::Result<()> {
    assohub::bootstrapper::run().await
}
