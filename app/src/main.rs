#[tokio::main]
async fn main() -> anyhow::Result<()> {
    keygate_lib::run().await
}
