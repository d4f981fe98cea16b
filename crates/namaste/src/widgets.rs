//! Shared terminal widgets: stat cards and a JSON syntax highlighter.

use colored::{ColoredString, Colorize};
use namaste_core::statistics::{stat_cards, Statistics};

use crate::prelude::{new_table, println};

/// Print the four statistics cards as a two-column table.
pub fn print_stat_cards(statistics: &Statistics) {
    let mut table = new_table();
    for card in stat_cards(statistics) {
        table.add_row(prettytable::row![
            card.label.bold().cyan(),
            card.value.to_string().bright_white().bold()
        ]);
    }
    table.printstd();
}

/// Print a section heading with an optional subtitle.
pub fn print_heading(title: &str, subtitle: Option<&str>) {
    println!();
    println!("{}", title.bold().bright_white());
    if let Some(subtitle) = subtitle {
        println!("{}", subtitle.bright_black());
    }
}

/// Colorize pretty-printed JSON: keys, strings, numbers and literals.
///
/// The input is expected to be valid JSON; anything unrecognised is passed
/// through uncoloured, so the text is never altered.
pub fn highlight_json(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let start = i;
                i += 1;
                while i < chars.len() {
                    match chars[i] {
                        '\\' => i += 2,
                        '"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                let end = i.min(chars.len());
                let token: String = chars[start..end].iter().collect();
                out.push_str(&paint_string(&token, is_key(&chars, end)).to_string());
            }
            '-' | '0'..='9' => {
                let start = i;
                while i < chars.len()
                    && matches!(chars[i], '-' | '+' | '.' | 'e' | 'E' | '0'..='9')
                {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                out.push_str(&token.yellow().to_string());
            }
            't' | 'f' | 'n' => {
                let literal = ["true", "false", "null"]
                    .into_iter()
                    .find(|lit| text_at(&chars, i, lit));
                match literal {
                    Some(lit) => {
                        out.push_str(&lit.magenta().to_string());
                        i += lit.len();
                    }
                    None => {
                        out.push(c);
                        i += 1;
                    }
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn paint_string(token: &str, key: bool) -> ColoredString {
    if key {
        token.cyan()
    } else {
        token.green()
    }
}

/// A string is an object key when the next non-blank character is `:`.
fn is_key(chars: &[char], from: usize) -> bool {
    chars[from..]
        .iter()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| *c == ':')
}

fn text_at(chars: &[char], at: usize, literal: &str) -> bool {
    literal
        .chars()
        .enumerate()
        .all(|(offset, expected)| chars.get(at + offset) == Some(&expected))
}
