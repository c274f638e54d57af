use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    storekit::cli::run().await?;
    Ok(())
}
