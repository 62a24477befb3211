#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inventaris::bootstrapper::run().await
}
