use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use csv_external_sort::loyal::{loyal_customers_in_memory, loyal_customers_sorted};

#[derive(Parser, Debug)]
#[command(
    name = "loyal-customers",
    version,
    about = "List customers who visited on at least two days and viewed at least two distinct pages"
)]
struct Cli {
    /// Daily logs of timestamp,page_id,customer_id lines, one file per day
    #[arg(required = true, num_args = 1..)]
    logs: Vec<PathBuf>,

    /// Sort the logs by customer with the external sort instead of keeping every customer in memory
    #[arg(long)]
    sorted: bool,

    /// Memory budget in bytes for the external sort
    #[arg(long, default_value_t = 10_000_000)]
    memory_budget: u64,

    /// Directory for sorted logs and run files
    #[arg(long, default_value = ".")]
    tmp_dir: PathBuf,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    SimpleLogger::new().with_level(cli.log_level).init()?;

    let loyal = if cli.sorted {
        loyal_customers_sorted(&cli.logs, &cli.tmp_dir, cli.memory_budget)?
    } else {
        loyal_customers_in_memory(&cli.logs)?
    };

    println!("There are {} loyal customers", loyal.len());
    for customer_id in loyal {
        println!("{}", customer_id);
    }
    Ok(())
}
