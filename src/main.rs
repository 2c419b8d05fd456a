use propedge::config::AppConfig;
use propedge::pipeline::run_analysis;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    println!("PropEdge NBA — player prop analyzer");
    println!(
        "Season {} | window {} games | near tolerance {}",
        config.season, config.window_games, config.near_tolerance
    );
    println!("----------------------------------------------------------");

    let summary = run_analysis(&config, |line| println!("{line}"))?;

    println!("----------------------------------------------------------");
    println!(
        "{} events, {} prop lines, {} players looked up ({} dropped)",
        summary.events, summary.prop_lines, summary.players_looked_up, summary.players_dropped
    );
    println!(
        "{} props scored, {} top picks (60+)",
        summary.props_scored, summary.top_picks
    );
    println!("Report: {}", summary.report_path.display());
    if let Some(xlsx) = &summary.xlsx_path {
        println!("Workbook: {}", xlsx.display());
    }
    Ok(())
}
