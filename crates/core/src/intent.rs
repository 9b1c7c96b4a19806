//! Prompt intent classification and item-mention extraction.
//!
//! A best-effort keyword heuristic, not a grammar. Ambiguous or adversarial
//! input degrades to [`Intent::GeneralQuestion`] rather than failing.

use serde::{Deserialize, Serialize};

use crate::domain::mention::ItemMention;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckAvailability,
    PlaceOrder,
    ProductInquiry,
    GeneralQuestion,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromptAnalysis {
    pub intent: Intent,
    pub mentions: Vec<ItemMention>,
    pub confidence: f64,
}

const ORDER_VERBS: &[&str] = &["order", "buy", "purchase"];
const CONFIRM_VERBS: &[&str] = &["confirm", "place", "complete"];
const AVAILABILITY_KEYWORDS: &[&str] = &["available", "stock", "check"];
const PRODUCT_KEYWORDS: &[&str] =
    &["lego", "playmobil", "monopoly", "barbie", "hot wheels", "toy", "game", "set"];

/// Minimum length for an extracted query fragment; shorter fragments are
/// connector noise.
const MIN_QUERY_LEN: usize = 3;

pub fn classify_prompt(prompt: &str) -> PromptAnalysis {
    let lower = prompt.to_lowercase();

    let mut mentions = extract_quantity_led_mentions(prompt);
    if mentions.is_empty() {
        mentions = extract_keyword_window_mention(&lower);
    }

    let has_order_verb = ORDER_VERBS.iter().any(|verb| lower.contains(verb));
    let has_confirm_verb = CONFIRM_VERBS.iter().any(|verb| lower.contains(verb));
    let has_availability_keyword =
        AVAILABILITY_KEYWORDS.iter().any(|keyword| lower.contains(keyword));

    let (intent, confidence) = if has_order_verb {
        if has_confirm_verb {
            (Intent::PlaceOrder, 0.9)
        } else {
            (Intent::CheckAvailability, 0.8)
        }
    } else if !mentions.is_empty() && has_availability_keyword {
        (Intent::CheckAvailability, 0.8)
    } else if !mentions.is_empty() {
        (Intent::ProductInquiry, 0.7)
    } else {
        (Intent::GeneralQuestion, 0.5)
    };

    PromptAnalysis { intent, mentions, confidence }
}

/// Pass 1: capture "<number> [x] <free text>" runs, each ending at the next
/// number, a connector ("and", comma) or the end of the prompt.
fn extract_quantity_led_mentions(prompt: &str) -> Vec<ItemMention> {
    let tokens: Vec<&str> = prompt.split_whitespace().collect();
    let mut mentions = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        let Some(quantity) = leading_quantity(tokens[index]) else {
            index += 1;
            continue;
        };

        let mut words: Vec<&str> = Vec::new();
        if let Some(rest) = glued_remainder(tokens[index]) {
            words.push(rest);
        }
        index += 1;

        // A bare "x" multiplier token between the number and the product text.
        if words.is_empty() && index < tokens.len() && tokens[index].eq_ignore_ascii_case("x") {
            index += 1;
        }

        while index < tokens.len() {
            let token = tokens[index];
            if leading_quantity(token).is_some() || is_connector(token) {
                break;
            }
            let trimmed = token.trim_end_matches([',', '.', '!', '?']);
            let ends_fragment = trimmed.len() != token.len();
            if !trimmed.is_empty() {
                words.push(trimmed);
            }
            index += 1;
            if ends_fragment {
                break;
            }
        }

        let query = words.join(" ");
        if query.len() >= MIN_QUERY_LEN {
            mentions.push(ItemMention::with_quantity(query, quantity));
        }
    }

    mentions
}

/// Pass 2: scan token windows of width 3 for a product keyword and extract
/// a padded window around the first hit as a single mention with no
/// explicit quantity.
fn extract_keyword_window_mention(lower: &str) -> Vec<ItemMention> {
    let words: Vec<&str> = lower.split_whitespace().collect();

    for index in 0..words.len() {
        let window_end = (index + 3).min(words.len());
        let window = words[index..window_end].join(" ");
        if !PRODUCT_KEYWORDS.iter().any(|keyword| window.contains(keyword)) {
            continue;
        }

        let start = index.saturating_sub(1);
        let end = (index + 4).min(words.len());
        let query = words[start..end].join(" ");
        if query.len() > MIN_QUERY_LEN {
            return vec![ItemMention::new(query)];
        }
        break;
    }

    Vec::new()
}

/// Parse tokens like "2", "2x" or "2x3000" into a leading quantity.
fn leading_quantity(token: &str) -> Option<u32> {
    let digits: String = token.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() || digits.len() < token.len() && !token[digits.len()..].starts_with(['x', 'X']) {
        return None;
    }
    digits.parse().ok().filter(|quantity| *quantity > 0)
}

/// The remainder of a glued token such as "2xLEGO" → "LEGO".
fn glued_remainder(token: &str) -> Option<&str> {
    let digit_count = token.chars().take_while(char::is_ascii_digit).count();
    let rest = &token[digit_count..];
    let rest = rest.strip_prefix(['x', 'X']).unwrap_or(rest);
    (!rest.is_empty()).then_some(rest)
}

fn is_connector(token: &str) -> bool {
    let trimmed = token.trim_end_matches([',', '.']);
    trimmed.eq_ignore_ascii_case("and") || trimmed.is_empty() || token == ","
}
