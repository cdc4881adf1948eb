#[tokio::main]
async fn main() -> anyhow::Result<()> {
    visa_app::run().await
}
