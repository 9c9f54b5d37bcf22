use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    aging_report::app::run_report(std::env::args().skip(1))
}
