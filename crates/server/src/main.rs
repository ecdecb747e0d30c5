// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
use clap::Parser;
use log::{error, info};
use pokeroom_server::sim::{self, CallOrCheck, SimConfig};

#[derive(Debug, Parser)]
struct Cli {
    /// Number of rooms.
    #[clap(long, short, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..=100))]
    rooms: u16,
    /// Number of players per room.
    #[clap(long, short, default_value_t = 3, value_parser = clap::value_parser!(u8).range(2..=9))]
    players: u8,
    /// Number of hands per room.
    #[clap(long, default_value_t = 20)]
    hands: u32,
    /// Seed for the rooms random source.
    #[clap(long, short)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = SimConfig {
        rooms: cli.rooms as usize,
        players: cli.players as usize,
        hands: cli.hands,
        seed: cli.seed,
    };

    match sim::run(config, || CallOrCheck).await {
        Ok(results) => {
            for result in results {
                let stacks = result
                    .stacks
                    .iter()
                    .map(|(nickname, stack)| format!("{nickname} {stack}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                info!("Room {}: {stacks}", result.room_id);
            }
        }
        Err(e) => error!("{e}"),
    }
}
