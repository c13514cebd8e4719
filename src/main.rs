//! rStaffPlan main entrypoint.

use rstaffplan::run;
use rstaffplan::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
