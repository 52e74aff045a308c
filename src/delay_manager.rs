use std::time::Duration;
use std::thread;
use rand::Rng;
use log::info;

/// Short pause after clicking apply, before navigating back to the results page.
pub fn post_apply_delay() {
    let mut rng = rand::thread_rng();
    let delay_secs = rng.gen_range(2..=4);
    info!("Waiting for {} seconds (Post-Apply Delay)...", delay_secs);
    thread::sleep(Duration::from_secs(delay_secs));
}
