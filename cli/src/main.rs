use clap::Parser;

mod vector;

/// Compute a CVSS v3.1 base score and severity from a base metric vector.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// The base metric vector, e.g. AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H
    vector: String,

    /// Emit the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let metrics = vector::parse(&cli.vector)?;
    log::debug!("parsed metrics: {metrics:?}");

    let score = metrics.score();
    let severity = score.severity();

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "score": score.value(),
                "severity": severity,
            })
        );
    } else {
        println!("{score} {severity}");
    }

    Ok(())
}
