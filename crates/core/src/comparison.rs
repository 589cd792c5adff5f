//! Comparison
//!
//! The ranked outcome of a basket optimization: one entry per qualifying
//! supermarket, cheapest first, plus terminal rendering for the ranking and
//! the per-product price breakdown.

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    basket::Basket, markets::MarketKey, matrix::PriceMatrix, optimize::MarketTotal, prices::Price,
};

/// Errors that can occur when rendering a comparison.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A ranked supermarket is not in the price matrix.
    #[error("Missing supermarket")]
    MissingMarket(MarketKey),

    /// IO error
    #[error("IO error")]
    IO,
}

/// The ranked outcome of a basket optimization, cheapest supermarket first.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    entries: Vec<MarketTotal>,
    currency: &'static Currency,
}

impl Comparison {
    /// Creates a comparison from ranked entries.
    ///
    /// Entries are expected cheapest first;
    /// [`optimize`](crate::optimize::optimize) is the usual producer.
    #[must_use]
    pub fn new(entries: Vec<MarketTotal>, currency: &'static Currency) -> Self {
        Self { entries, currency }
    }

    /// The ranked entries, cheapest first.
    #[must_use]
    pub fn entries(&self) -> &[MarketTotal] {
        &self.entries
    }

    /// Iterates over the ranked entries, cheapest first.
    pub fn iter(&self) -> impl Iterator<Item = &MarketTotal> {
        self.entries.iter()
    }

    /// Currency shared by every total.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Returns the number of ranked supermarkets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no supermarket qualified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The cheapest supermarket, if any qualified.
    #[must_use]
    pub fn best(&self) -> Option<&MarketTotal> {
        self.entries.first()
    }

    /// The most expensive supermarket, if any qualified.
    #[must_use]
    pub fn worst(&self) -> Option<&MarketTotal> {
        self.entries.last()
    }

    /// What shopping at the cheapest supermarket saves over the most
    /// expensive one. Zero when fewer than two supermarkets are ranked.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Price, MoneyError> {
        if self.entries.len() < 2 {
            return Ok(Money::from_minor(0, self.currency));
        }

        match (self.worst(), self.best()) {
            (Some(worst), Some(best)) => worst.total.sub(best.total),
            _ => Ok(Money::from_minor(0, self.currency)),
        }
    }

    /// The savings as a fraction of the most expensive total.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings = self.savings()?;
        let worst_amount = self.worst().map_or(Decimal::ZERO, |entry| *entry.total.amount());

        if worst_amount == Decimal::ZERO {
            return Ok(Percentage::from(0.0));
        }

        Ok(Percentage::from(*savings.amount() / worst_amount))
    }

    /// Prints the ranking table and summary to the console.
    ///
    /// An empty comparison writes nothing; the caller knows whether that
    /// means the completeness requirement excluded every supermarket or no
    /// price data matched the basket.
    ///
    /// # Errors
    ///
    /// Returns an error if the comparison cannot be printed.
    pub fn write_to(&self, mut out: impl io::Write, matrix: &PriceMatrix) -> Result<(), ReportError> {
        if self.is_empty() {
            return Ok(());
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Supermarket", "Total", "Available", "Missing", ""]);

        let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = smallvec![];

        for (idx, entry) in self.entries.iter().enumerate() {
            let row = idx + 1;
            let name = market_name(matrix, entry.market)?;
            let note = if entry.has_penalty { "includes penalty" } else { "" };

            builder.push_record([
                format!("#{row:<3}"),
                name.to_string(),
                display_price(entry.total),
                entry.available.to_string(),
                entry.missing.to_string(),
                note.to_string(),
            ]);

            if idx == 0 {
                color_ops.push((row, 1, Color::FG_GREEN));
                color_ops.push((row, 2, Color::FG_GREEN));
            } else if entry.has_penalty {
                color_ops.push((row, 2, color_dark_yellow()));
            }

            if entry.has_penalty {
                color_ops.push((row, 5, color_dark_grey()));
            }
        }

        write_styled_table(&mut out, builder, 2..5, color_ops)?;

        self.write_summary(&mut out, matrix)?;

        Ok(())
    }

    /// Prints the per-product price table to the console: one row per basket
    /// product the matrix knows, one column per ranked supermarket, with a
    /// dash where the supermarket has no price.
    ///
    /// # Errors
    ///
    /// Returns an error if the breakdown cannot be printed.
    pub fn write_price_breakdown(
        &self,
        mut out: impl io::Write,
        basket: &Basket,
        matrix: &PriceMatrix,
    ) -> Result<(), ReportError> {
        if self.is_empty() {
            return Ok(());
        }

        let mut builder = Builder::default();
        let mut header = vec!["Product".to_string()];

        for entry in &self.entries {
            header.push(market_name(matrix, entry.market)?.to_string());
        }

        builder.push_record(header);

        let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = smallvec![];
        let mut row = 1;

        for name in basket.iter() {
            let Some(product) = matrix.product_key(name) else {
                continue;
            };

            let mut record = vec![name.to_string()];

            for (idx, entry) in self.entries.iter().enumerate() {
                match entry.prices.get(&product) {
                    Some(price) => record.push(display_price(*price)),
                    None => {
                        record.push("—".to_string());
                        color_ops.push((row, idx + 1, color_dark_grey()));
                    }
                }
            }

            builder.push_record(record);
            row += 1;
        }

        let last_column = self.entries.len().saturating_add(1);

        write_styled_table(&mut out, builder, 1..last_column, color_ops)
    }

    fn write_summary(&self, out: &mut impl io::Write, matrix: &PriceMatrix) -> Result<(), ReportError> {
        let (Some(best), Some(worst)) = (self.best(), self.worst()) else {
            return Ok(());
        };

        let savings = self.savings()?;
        let savings_points = percent_points(self.savings_percent()?);

        let cheapest_label = " \x1b[1mCheapest:\x1b[0m";
        let priciest_label = " Most expensive:";
        let savings_label = " Savings:";

        let cheapest_val = format!(
            "\x1b[1m{} {}  \x1b[0m",
            market_name(matrix, best.market)?,
            display_price(best.total)
        );
        let priciest_val = format!(
            "{} {}  ",
            market_name(matrix, worst.market)?,
            display_price(worst.total)
        );
        let savings_val = format!("({savings_points:.1}%) {}  ", display_price(savings));

        let label_width = visible_width(cheapest_label)
            .max(visible_width(priciest_label))
            .max(visible_width(savings_label));

        let value_width = visible_width(&cheapest_val)
            .max(visible_width(&priciest_val))
            .max(visible_width(&savings_val));

        write_summary_line(out, cheapest_label, &cheapest_val, label_width, value_width)?;

        if self.len() > 1 {
            write_summary_line(out, priciest_label, &priciest_val, label_width, value_width)?;
            write_summary_line(out, savings_label, &savings_val, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReportError::IO)
    }
}

fn market_name<'m>(matrix: &'m PriceMatrix, key: MarketKey) -> Result<&'m str, ReportError> {
    matrix
        .market(key)
        .map(|market| market.name.as_str())
        .ok_or(ReportError::MissingMarket(key))
}

/// Formats a price rounded to its currency's usual number of decimal places.
fn display_price(price: Price) -> String {
    let rounded = price.amount().round_dp(price.currency().exponent);

    format!("{}", Money::from_decimal(rounded, price.currency()))
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::new(100, 0)).round_dp(1)
}

fn write_styled_table(
    out: &mut impl io::Write,
    builder: Builder,
    right_columns: std::ops::Range<usize>,
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReportError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(right_columns), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReportError::IO)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F. This
/// function scans each character, grouping consecutive border characters and
/// emitting a single grey escape sequence around each run, leaving cell
/// content untouched.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReportError> {
    let label_vis = visible_width(label);
    let value_vis = visible_width(value);

    // 2 chars of spacing between label and value column.
    let label_pad = label_col_width.saturating_sub(label_vis);
    let value_pad = value_col_width.saturating_sub(value_vis);

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReportError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

/// ANSI dark yellow (a total that includes a missing-product penalty).
fn color_dark_yellow() -> Color {
    Color::new("\x1b[33m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::optimize::{PenaltyMethod, optimize};

    use super::*;

    fn entry(total_minor: i64) -> MarketTotal {
        MarketTotal {
            market: MarketKey::default(),
            total: Money::from_minor(total_minor, GBP),
            available: 1,
            missing: 0,
            prices: FxHashMap::default(),
            has_penalty: false,
        }
    }

    /// Milk at both supermarkets, Bread only at ASDA, compared with the
    /// average penalty so Tesco wins at 2.60 against ASDA's 3.00.
    fn sample() -> TestResult<(PriceMatrix, Basket, Comparison)> {
        let mut matrix = PriceMatrix::new(GBP);

        let milk = matrix.add_product("Milk")?;
        let bread = matrix.add_product("Bread")?;
        let asda = matrix.add_market("ASDA")?;
        let tesco = matrix.add_market("Tesco")?;

        matrix.set_price(milk, asda, Money::from_minor(100, GBP))?;
        matrix.set_price(milk, tesco, Money::from_minor(120, GBP))?;
        matrix.set_price(bread, asda, Money::from_minor(200, GBP))?;

        let basket = Basket::from_names(["Milk", "Bread"]);
        let comparison = optimize(&basket, &matrix, false, PenaltyMethod::Average)?;

        Ok((matrix, basket, comparison))
    }

    #[test]
    fn best_is_first_and_worst_is_last() {
        let comparison = Comparison::new(vec![entry(100), entry(200), entry(300)], GBP);

        assert_eq!(comparison.best().map(|e| e.total), Some(Money::from_minor(100, GBP)));
        assert_eq!(comparison.worst().map(|e| e.total), Some(Money::from_minor(300, GBP)));
    }

    #[test]
    fn savings_is_worst_total_minus_best_total() -> TestResult {
        let comparison = Comparison::new(vec![entry(250), entry(300)], GBP);

        assert_eq!(comparison.savings()?, Money::from_minor(50, GBP));

        Ok(())
    }

    #[test]
    fn savings_percent_is_relative_to_the_most_expensive_total() -> TestResult {
        let comparison = Comparison::new(vec![entry(150), entry(200)], GBP);

        assert_eq!(percent_points(comparison.savings_percent()?), Decimal::new(250, 1));

        Ok(())
    }

    #[test]
    fn a_single_entry_saves_nothing() -> TestResult {
        let comparison = Comparison::new(vec![entry(250)], GBP);

        assert_eq!(comparison.savings()?, Money::from_minor(0, GBP));
        assert_eq!(percent_points(comparison.savings_percent()?), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn writes_a_ranked_table_with_summary() -> TestResult {
        let (matrix, _, comparison) = sample()?;

        let mut buffer = Vec::new();
        comparison.write_to(&mut buffer, &matrix)?;

        let output = String::from_utf8(buffer)?;

        assert!(output.contains("Supermarket"));
        assert!(output.contains("Tesco"));
        assert!(output.contains("includes penalty"));
        assert!(output.contains("Cheapest:"));
        assert!(output.contains("Savings:"));

        Ok(())
    }

    #[test]
    fn an_empty_comparison_writes_nothing() -> TestResult {
        let matrix = PriceMatrix::new(GBP);
        let comparison = Comparison::new(Vec::new(), GBP);

        let mut buffer = Vec::new();
        comparison.write_to(&mut buffer, &matrix)?;

        assert!(buffer.is_empty());

        Ok(())
    }

    #[test]
    fn breakdown_marks_missing_prices_with_a_dash() -> TestResult {
        let (matrix, basket, comparison) = sample()?;

        let mut buffer = Vec::new();
        comparison.write_price_breakdown(&mut buffer, &basket, &matrix)?;

        let output = String::from_utf8(buffer)?;

        assert!(output.contains("Milk"));
        assert!(output.contains("Bread"));
        assert!(output.contains('—'));

        Ok(())
    }
}
