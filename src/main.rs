use clap::Parser;
use std::error::Error;
use std::io::IsTerminal;
use subnet_ip_usage::config::Opts;
use subnet_ip_usage::inventory::{AwsCliInventory, CachedInventory};
use subnet_ip_usage::{run_report, write_report};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    log4rs::init_file("log4rs.yml", Default::default())
        .map_err(|e| format!("Error initializing log4rs from log4rs.yml: {e}"))?;
    let opts = Opts::parse();
    log::info!("#Start main() {:?}", opts);

    let aws = AwsCliInventory::new(&opts.region, opts.default_vpc);
    let report = if opts.no_cache {
        run_report(&aws).await?
    } else {
        let cached = CachedInventory::new(aws, opts.cache_file, &opts.region, opts.default_vpc);
        log::info!("inventory cache file: {}", cached.path().display());
        run_report(&cached).await?
    };

    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    write_report(&report, opts.format, &mut stdout.lock(), color)?;

    log::info!("#End main()");
    Ok(())
}
