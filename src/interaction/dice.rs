//! Dice roller: `/roll` or `/roll d6`.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;
use tracing::{info, instrument};

use crate::base::types::SlashCommand;

/// Sides used when the command does not name a die.
pub const DEFAULT_SIDES: u32 = 20;

static DIE: OnceLock<Regex> = OnceLock::new();

/// Reads the optional `dN` argument.
///
/// Empty text means the default die; anything other than a single `dN` with
/// `N >= 1` is `None`.
pub fn parse_sides(text: &str) -> Option<u32> {
    let text = text.trim();

    if text.is_empty() {
        return Some(DEFAULT_SIDES);
    }

    let die = DIE.get_or_init(|| Regex::new(r"(?i)^d(\d+)$").unwrap());
    let captures = die.captures(text)?;

    captures[1].parse::<u32>().ok().filter(|sides| *sides >= 1)
}

/// Rolls a die with `sides` sides using `rng`.
pub fn roll<R: Rng>(rng: &mut R, sides: u32) -> u32 {
    rng.gen_range(1..=sides)
}

/// Handles the `/roll` slash command.
#[instrument(skip_all)]
pub fn handle_roll(command: &SlashCommand) -> String {
    let Some(sides) = parse_sides(&command.text) else {
        return "Usage: `/roll [dN]`, where N is at least 1 (e.g. `/roll d6`).".to_string();
    };

    let value = roll(&mut rand::thread_rng(), sides);

    info!("Rolled a d{} for `{}`.", sides, command.user_id);

    format!(":game_die: <@{}> rolled a d{} and got {}.", command.user_id, sides, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn command(text: &str) -> SlashCommand {
        SlashCommand {
            command: "/roll".to_string(),
            text: text.to_string(),
            user_id: "U1".to_string(),
            channel_id: "C1".to_string(),
        }
    }

    fn rolled_value(reply: &str) -> u32 {
        reply.trim_end_matches('.').rsplit(' ').next().unwrap().parse().unwrap()
    }

    #[test]
    fn test_parse_sides() {
        assert_eq!(parse_sides(""), Some(20));
        assert_eq!(parse_sides("d6"), Some(6));
        assert_eq!(parse_sides("  D100 "), Some(100));
        assert_eq!(parse_sides("d0"), None);
        assert_eq!(parse_sides("d99999999999"), None);
    }

    #[test]
    fn test_parse_sides_rejects_anything_but_a_die() {
        assert_eq!(parse_sides("banana"), None);
        assert_eq!(parse_sides("6"), None);
        assert_eq!(parse_sides("d6 please"), None);
        assert_eq!(parse_sides("2d6"), None);
    }

    #[test]
    fn test_roll_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);

        for sides in [1, 2, 6, 20] {
            for _ in 0..500 {
                let value = roll(&mut rng, sides);
                assert!((1..=sides).contains(&value));
            }
        }
    }

    #[test]
    fn test_roll_d1_is_always_one() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!((0..100).all(|_| roll(&mut rng, 1) == 1));
    }

    #[test]
    fn test_handle_roll() {
        for _ in 0..200 {
            let reply = handle_roll(&command("d6"));
            assert!(reply.starts_with(":game_die: <@U1> rolled a d6 and got "));
            assert!((1..=6).contains(&rolled_value(&reply)));

            let reply = handle_roll(&command(""));
            assert!(reply.contains("rolled a d20"));
            assert!((1..=20).contains(&rolled_value(&reply)));
        }
    }

    #[test]
    fn test_handle_roll_rejects_bad_input() {
        assert!(handle_roll(&command("d0")).starts_with("Usage:"));
        assert!(handle_roll(&command("banana")).starts_with("Usage:"));
        assert!(handle_roll(&command("6")).starts_with("Usage:"));
    }
}
