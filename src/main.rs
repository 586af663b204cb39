use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use paper_explorer::config::{Cli, parse_year_range};
use paper_explorer::data::cache::DatasetCache;
use paper_explorer::report::{Dashboard, DashboardOptions};
use paper_explorer::state::ExplorerState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = cli.dashboard_options();

    let mut cache = DatasetCache::new();
    let dataset = cache
        .get_or_load(&cli.path)
        .with_context(|| format!("loading {}", cli.path.display()))?;

    if dataset.is_empty() {
        warn!("no records in {} survived cleaning", cli.path.display());
    }

    let mut state = ExplorerState::new(dataset);
    if let Some(range) = state
        .dataset
        .year_bounds
        .and_then(|bounds| cli.requested_range(bounds))
    {
        state.set_year_range(range);
    }

    print_dashboard(&state, &options, &cli)?;
    if cli.interactive {
        run_interactive(&cli, &options, &mut cache, &mut state)?;
    }
    Ok(())
}

fn print_dashboard(state: &ExplorerState, options: &DashboardOptions, cli: &Cli) -> Result<()> {
    let rendered = Dashboard::build(state, options).render(cli.format)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;
    Ok(())
}

/// Read `LO HI` lines from stdin and re-render for each.  The file is
/// re-checked through the cache so edits on disk are picked up.
fn run_interactive(
    cli: &Cli,
    options: &DashboardOptions,
    cache: &mut DatasetCache,
    state: &mut ExplorerState,
) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        eprint!("year range (LO HI, q to quit)> ");
        io::stderr().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line).context("reading stdin")? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let range = match parse_year_range(input) {
            Ok(range) => range,
            Err(e) => {
                warn!("{e:#}");
                continue;
            }
        };
        match cache.get_or_load(&cli.path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => warn!("reload of {} failed, keeping previous data: {e}", cli.path.display()),
        }
        state.set_year_range(range);
        print_dashboard(state, options, cli)?;
    }
    Ok(())
}
