use anyhow::Context;

fn main() -> anyhow::Result<()> {
    schemekit::run().context("schemekit failed")?;
    Ok(())
}
