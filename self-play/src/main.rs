// Plays Ticket to Ride games from the command line, between random and human players.

mod human;
mod options;
mod runner;

use anyhow::bail;
use env_logger::Env;
use log::{error, info};
use options::{GameConfig, Opt};
use runner::BatchStats;
use structopt::StructOpt;

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "self_play=debug,ticket_to_ride=debug"
    } else {
        "self_play=info,ticket_to_ride=info"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    init_logging(opt.verbose);

    let config = GameConfig::from_opt(&opt)?;
    let num_players = config.players.len();
    info!(
        "Playing {} {} game(s) with players {:?}.",
        opt.games, opt.variant, config.players
    );

    let mut reports = Vec::with_capacity(opt.games);
    let mut num_failed = 0;

    for result in runner::run_games(config, opt.games, opt.seed, opt.threads) {
        match result {
            Ok(report) => {
                if opt.json {
                    println!("{}", serde_json::to_string(&report)?);
                } else {
                    println!("{}", report);
                }
                reports.push(report);
            }
            Err(e) => {
                error!("{:#}", e);
                num_failed += 1;
            }
        }
    }

    if !opt.json && reports.len() > 1 {
        println!("{}", BatchStats::new(&reports, num_players));
    }

    if num_failed > 0 {
        bail!("{} of {} games failed.", num_failed, opt.games);
    }

    Ok(())
}
