use anyhow::Result;
use dyncolorcli::{init_logging, AppOptions, DynColorCliApp};

fn main() -> Result<()> {
    init_logging(false);

    let mut app = DynColorCliApp::new(AppOptions::default())?;
    println!("dyncolor started successfully!");

    app.run()?;

    Ok(())
}
