use anyhow::Result;
use clap::Parser;
use mealplan_rs::cli::Args;
use mealplan_rs::outlet::{DiskOutlet, Outlet};
use mealplan_rs::{launch, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 不存在时忽略
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init(args.verbose);

    let config = args.resolve_config()?;
    let preferences = args.preferences()?;
    let location = preferences.location().to_string();

    let report = launch(&config, preferences).await?;

    let banner = "=".repeat(80);
    println!("\n{}", banner);
    println!("Meal Planning Report");
    println!("{}\n", banner);
    println!("{}", report);

    if !args.no_save {
        let outlet = DiskOutlet::new(config.output_dir.clone());
        let path = outlet.save(&location, &report).await?;
        println!("\nMeal plan saved to {}", path.display());
    }

    Ok(())
}
