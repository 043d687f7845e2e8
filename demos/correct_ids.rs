use anyhow::Result;
use clap::{Parser, Subcommand};
use gazexr::prelude::*;
use std::path::PathBuf;

/// Manual identity corrections on a saved track store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Track store written by a tracking session
    tracks: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Exchange two identities in frames `from..=to`
    Swap {
        a: u64,
        b: u64,
        from: usize,
        /// Last frame, defaults to the end of the store
        to: Option<usize>,
    },
    /// Delete an identity in frames `from..=to`
    Remove {
        id: u64,
        from: usize,
        /// Last frame, defaults to the end of the store
        to: Option<usize>,
    },
    /// Prepend empty frames
    Pad { frames: usize },
    /// Print the identities present in the store
    Ids,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut store = TrackStore::load(&args.tracks)?;

    match args.command {
        Command::Ids => {
            println!("{:?}", store.track_ids());
            return Ok(());
        }
        Command::Swap { a, b, from, to } => {
            let changed = store.swap_ids(a, b, from, to);
            eprintln!("{} records changed", changed);
        }
        Command::Remove { id, from, to } => {
            let removed = store.remove_ids(id, from, to);
            eprintln!("{} records removed", removed);
        }
        Command::Pad { frames } => store.pad_front(frames),
    }

    store.save(&args.tracks)
}
