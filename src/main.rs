// src/main.rs
// Entry point for Maze Walker: loads configuration, picks a robot runtime and
// runs the wall follower until the runtime ends the run.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};
use maze_walker::{MazeRunner, ReplayRobot, Result, RunStatus, Scenario, WallFollowerConfig};

/// Left-hand wall follower for differential-drive robots
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    runtime: Runtime,
}

#[derive(Subcommand, Debug)]
enum Runtime {
    /// Replay a recorded sensor scenario
    Replay {
        /// Scenario YAML file
        scenario: PathBuf,
    },
    /// Drive a robot over ROS 2 topics
    #[cfg(feature = "ros")]
    Ros,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(status) => {
            info!("Final status: {:?}", status);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<RunStatus> {
    let config = match &args.config {
        Some(path) => WallFollowerConfig::load(path)?,
        None => {
            info!("Using default configuration");
            WallFollowerConfig::default()
        }
    };

    match args.runtime {
        Runtime::Replay { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let mut runner = MazeRunner::new(config, ReplayRobot::new(scenario));
            let status = runner.run()?;
            info!(
                "Replay sent {} wheel commands",
                runner.robot().command_log().len()
            );
            Ok(status)
        }
        #[cfg(feature = "ros")]
        Runtime::Ros => {
            let robot = maze_walker::robot_interface::RosRobot::new(&config.ros)?;
            MazeRunner::new(config, robot).run()
        }
    }
}
