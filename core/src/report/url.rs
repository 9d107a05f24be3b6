//! Report URL parsing.
//!
//! Accepts either a bare report code or a full report URL such as
//! `https://www.fflogs.com/reports/AbC123xYz#fight=5&type=damage-done`.

use super::{FightSelector, ReportError};

const REPORTS_SEGMENT: &str = "reports/";

/// Report code and optional fight selection from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocator {
    pub code: String,
    pub fight: Option<FightSelector>,
}

pub fn parse_report_url(input: &str) -> Result<ReportLocator, ReportError> {
    let input = input.trim();
    let code = parse_report_code(input).ok_or_else(|| ReportError::InvalidReportUrl {
        input: input.to_string(),
    })?;
    Ok(ReportLocator {
        code,
        fight: parse_fight_fragment(input),
    })
}

/// Alphanumeric run after `reports/`, or the whole input when it is already
/// a bare code.
pub fn parse_report_code(input: &str) -> Option<String> {
    let tail = match input.find(REPORTS_SEGMENT) {
        Some(idx) => &input[idx + REPORTS_SEGMENT.len()..],
        None if input.chars().all(|c| c.is_ascii_alphanumeric()) => input,
        None => return None,
    };
    let code: String = tail
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    (!code.is_empty()).then_some(code)
}

/// `fight=<n>` or `fight=last` anywhere in the query or fragment.
pub fn parse_fight_fragment(input: &str) -> Option<FightSelector> {
    let (_, rest) = input.split_once("fight=")?;
    let value: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    FightSelector::parse(&value)
}
