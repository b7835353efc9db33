use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use lifecycle_demo::Scenario;

#[derive(Parser, Debug)]
#[command(version, about = "Drive the demo nodes through a scripted scenario")]
struct Args {
    /// JSON scenario file; the built-in scenario runs when omitted.
    scenario: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = match args.scenario {
        Some(path) => Scenario::load(&path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => {
            log::info!("no scenario given, running the built-in one");
            Scenario::builtin()
        }
    };
    let report = scenario.run().context("running scenario")?;

    for frame in &report.frames {
        println!("{frame}");
    }
    println!();
    println!("requests:    {:?}", report.requests);
    println!("renders:     {}", report.profile_renders);
    println!("stale drops: {}", report.stale_drops);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_args_scenario_optional() {
        let args = Args::try_parse_from(["lifecycle_demo"]).unwrap();
        assert!(args.scenario.is_none());

        let args = Args::try_parse_from(["lifecycle_demo", "steps.json"]).unwrap();
        assert_eq!(args.scenario, Some(PathBuf::from("steps.json")));

        assert!(Args::try_parse_from(["lifecycle_demo", "a.json", "b.json"]).is_err());
    }
}
