//! Command line program for driving calibration experiments against an
//! external simulation program.

#[macro_use]
extern crate log;

pub mod cli;

use colored::*;

fn main() {
    // Run the program based on user input
    match cli::start(cli::app().get_matches()) {
        Ok(_) => (),
        Err(e) => {
            println!("{}{}", "error: ".red(), e);
            if e.root_cause().to_string() != e.to_string() {
                println!("Caused by:\n{}", e.root_cause())
            }
        }
    }
}
