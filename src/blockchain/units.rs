// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-point token amounts as decimal strings.

use std::str::FromStr;

use alloy::primitives::U256;

use super::client::ChainError;

/// A syntactically valid non-negative decimal such as `"1.5"` or `"0"`.
///
/// Parsing checks only the syntax; scaling to the smallest unit needs the
/// token's decimals, see [`DecimalAmount::to_units`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalAmount {
    whole: String,
    fraction: String,
}

impl FromStr for DecimalAmount {
    type Err = ChainError;

    fn from_str(amount: &str) -> Result<Self, Self::Err> {
        let amount = amount.trim();
        let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(ChainError::InvalidArgument(format!(
                "Invalid amount format: {:?}",
                amount
            )));
        }

        Ok(Self {
            whole: whole.to_string(),
            // Trailing zeros carry no value
            fraction: fraction.trim_end_matches('0').to_string(),
        })
    }
}

impl DecimalAmount {
    /// Amount in the smallest unit of a token with `decimals` decimals.
    pub fn to_units(&self, decimals: u8) -> Result<U256, ChainError> {
        if self.fraction.len() > decimals as usize {
            return Err(ChainError::InvalidArgument(format!(
                "Too many decimal places (max {})",
                decimals
            )));
        }

        let whole = if self.whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(&self.whole, 10)
                .map_err(|_| ChainError::InvalidArgument("Amount overflow".to_string()))?
        };

        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", self.fraction, width = decimals as usize);
        let fraction = if padded.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(&padded, 10)
                .map_err(|_| ChainError::InvalidArgument("Invalid decimal".to_string()))?
        };

        let multiplier = U256::from(10u64).pow(U256::from(decimals));
        whole
            .checked_mul(multiplier)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(|| ChainError::InvalidArgument("Amount overflow".to_string()))
    }
}

/// Format smallest-unit amount to a human-readable decimal string.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let digits = remainder.to_string();
        let decimal_str = format!("{}{}", "0".repeat(decimals as usize - digits.len()), digits);
        let trimmed = decimal_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}
