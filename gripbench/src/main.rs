//! # gripbench
//!
//! Runs the goal-conditioned gripper tasks from the command line.

use anyhow::Result;
use clap::Parser;
use gripbench::app::{self, Cli};

fn main() -> Result<()> {
    app::run(Cli::parse())
}
