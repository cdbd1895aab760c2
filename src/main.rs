mod command;
mod config;
mod controller;
mod engine;
mod error;
mod library;
mod mode;
mod notify;
mod playlist;
mod runtime;
mod tracklist;
mod volume;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
