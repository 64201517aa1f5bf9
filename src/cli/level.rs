//! Level command implementation

use guildhall::progression::{Progress, xp_progress};

/// Print where `xp` sits on the leveling curve
pub fn level_command(xp: u64) {
    let progress = Progress::new(xp);
    let band = xp_progress(xp);
    println!("XP:             {}", xp);
    println!("Level:          {}", progress.level);
    println!("Next level in:  {} xp", progress.xp_for_next_level);
    println!(
        "Band progress:  {}/{} ({:.0}%)",
        band.current,
        band.total,
        progress.fraction() * 100.0
    );
}
