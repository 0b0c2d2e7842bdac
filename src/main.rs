use adlens::cli::commands::{Cli, Commands};
use adlens::domain::entities::details::{AudienceSalesDetail, KnownGroup, MonthlyPlanDetail};
use adlens::domain::entities::metric_record::MetricRecord;
use adlens::{AdLens, HistoryOptions};
use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let db_path = std::env::var("ADLENS_DB").unwrap_or_else(|_| "./adlens.db".into());

    let lens = match AdLens::new(&db_path) {
        Ok(lens) => lens,
        Err(e) => {
            eprintln!("Error initializing adlens: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(lens, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(lens: AdLens, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::RecordAdd { json } => {
            let record: MetricRecord = serde_json::from_str(&json)?;
            lens.add_record(&record).await?;
            println!("Recorded {} for {}", record.date, record.audience_label);
        }
        Commands::History {
            client,
            product,
            primary_group,
            account,
            campaign,
        } => {
            let options = HistoryOptions {
                only_primary_group: primary_group,
                ad_account_id: account,
                campaign_id: campaign,
            };
            let rows = lens.get_history(&client, &product, &options).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::SalesSet { json } => {
            let detail: AudienceSalesDetail = serde_json::from_str(&json)?;
            lens.set_audience_sales(&detail).await?;
            println!(
                "Saved sales detail for {} / {}",
                detail.month_label, detail.audience_label
            );
        }
        Commands::PlanSet { json } => {
            let detail: MonthlyPlanDetail = serde_json::from_str(&json)?;
            lens.set_monthly_plan(&detail).await?;
            println!("Saved plan detail for {}", detail.month_label);
        }
        Commands::GroupAdd { json } => {
            let group: KnownGroup = serde_json::from_str(&json)?;
            lens.add_known_group(&group).await?;
            println!("Registered group {} -> {}", group.audience_label, group.ad_set_id);
        }
        Commands::Stats => {
            let stats = lens.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
