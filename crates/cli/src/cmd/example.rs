//! Print a starter plan file

use anyhow::Result;

pub fn run() -> Result<()> {
    print!("{}", bd_core::EXAMPLE_PLAN);
    Ok(())
}
