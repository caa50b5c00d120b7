//! Terminal rendering - ASCII only, colour for status.

use letterlab_common::report::{format_text, ProgressReport};
use letterlab_common::{
    ArcadeGame, ArcadeProgress, ConfusionPairProgress, LetterProgress, StarField,
};
use owo_colors::OwoColorize;

const HR: &str = "------------------------------------------------------------";

/// `***` style rating, padded to three columns
pub fn star_bar(stars: u8) -> String {
    let filled = "*".repeat(stars.min(3) as usize);
    format!("{:<3}", filled)
}

fn accuracy_colored(accuracy: u8) -> String {
    let text = format!("{:>3}%", accuracy);
    if accuracy >= 80 {
        text.bright_green().to_string()
    } else if accuracy >= 60 {
        text.yellow().to_string()
    } else {
        text.bright_red().to_string()
    }
}

pub fn print_report(report: &ProgressReport) {
    println!();
    println!("{}", "[REPORT]".bold());
    println!("{}", HR.dimmed());
    print!("{}", format_text(report));
    println!("{}", HR.dimmed());

    for card in &report.per_letter {
        let lock = if card.unlocked {
            "[open]".bright_green().to_string()
        } else {
            "[lock]".dimmed().to_string()
        };
        println!(
            "  {}  rec {} up {} low {} draw {}  conf {}  {}",
            card.id.to_uppercase().bold(),
            star_bar(card.recog),
            star_bar(card.uc),
            star_bar(card.lc),
            star_bar(card.draw),
            accuracy_colored(card.confusion_score),
            lock
        );
    }
    println!();
}

pub fn print_letter(id: &str, p: &LetterProgress) {
    println!();
    println!("{} {}", "[LETTER]".bold(), id.to_uppercase());
    println!("{}", HR.dimmed());
    for field in StarField::ALL {
        println!("  {:<16} {}", field.as_key(), star_bar(p.stars(field)));
    }
    println!("  {:<16} {}", "confusionScore", accuracy_colored(p.confusion_score));
    let history: Vec<String> = p
        .confusion_history
        .iter()
        .map(|h| h.score.to_string())
        .collect();
    println!("  {:<16} [{}]", "confusionHistory", history.join(" "));
    println!(
        "  {:<16} monster {} | hero {} | catch {} | garden {}",
        "highScores",
        p.monster_high_score,
        p.hero_high_score,
        p.catch_high_score,
        p.garden_high_score
    );
    println!("  {:<16} {} ms", "timeSpent", p.time_spent_ms);
    let unlocked = if p.is_unlocked() {
        "yes".bright_green().to_string()
    } else {
        "no".yellow().to_string()
    };
    println!("  {:<16} {}", "gamesUnlocked", unlocked);
    println!();
}

pub fn print_pairs(pairs: &[ConfusionPairProgress]) {
    if pairs.is_empty() {
        println!("No confusion pairs recorded yet.");
        return;
    }
    for p in pairs {
        println!(
            "  {:<6} {}  ({} right, {} wrong)",
            p.pair.as_str(),
            accuracy_colored(p.accuracy),
            p.correct,
            p.wrong
        );
    }
}

pub fn print_arcade(arcade: &ArcadeProgress) {
    println!();
    println!("{}", "[ARCADE]".bold());
    println!("{}", HR.dimmed());
    for game in ArcadeGame::ALL {
        println!(
            "  {:<8} best {:>6}  {}",
            game.name(),
            arcade.high(game),
            star_bar(arcade.stars(game))
        );
    }
    println!("  {:<8} {}", "stickers", arcade.stickers);
    println!();
}

/// Display an error tagged with its code (ASCII-only)
pub fn display_error(code: &str, message: &str) {
    eprintln!("[ERROR:{}] {}", code, message.red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_bar_pads_and_clamps() {
        assert_eq!(star_bar(0), "   ");
        assert_eq!(star_bar(2), "** ");
        assert_eq!(star_bar(9), "***");
    }
}
