//! Equation interpreter
//!
//! `:nth-last-child(-n+K)` selects the last K children. Read as a template
//! directive, it asks for K sibling copies, which is the only arithmetic shape
//! given synthesis meaning.

use super::{Equation, Sign, Token, TokenKind};

/// Apply a sign to a digit run; empty digits stand for a magnitude of 1
fn signed(sign: Option<Sign>, digits: &str) -> Option<i64> {
    let magnitude = if digits.is_empty() {
        1
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(match sign {
        Some(Sign::Minus) => -magnitude,
        Some(Sign::Plus) | None => magnitude,
    })
}

impl Equation {
    /// The scalar with its sign applied (`-` alone is -1, nothing is 1)
    pub fn signed_scalar(&self) -> Option<i64> {
        signed(self.scalar_sign, &self.scalar)
    }

    /// The offset with its sign applied, `None` when no offset was written
    pub fn signed_offset(&self) -> Option<i64> {
        let sign = self.offset_sign?;
        signed(Some(sign), &self.offset)
    }

    /// Repeat multiplier for `nth-last-child(-n+K)`, `None` for every other shape
    pub fn repeat_multiplier(&self) -> Option<i64> {
        if self.function != "nth-last-child" || self.variable.as_deref() != Some("n") {
            return None;
        }
        if self.signed_scalar()? != -1 {
            return None;
        }
        self.signed_offset()
    }

    /// Coefficients `(a, b)` of an `An+B` argument, including `odd` / `even`
    pub fn affine(&self) -> Option<(i64, i64)> {
        let bare = self.scalar_sign.is_none() && self.scalar.is_empty();
        match self.variable.as_deref() {
            None => {
                if self.scalar.is_empty() || self.offset_sign.is_some() {
                    return None;
                }
                Some((0, self.signed_scalar()?))
            }
            Some("n") => {
                let b = match self.offset_sign {
                    Some(_) if self.offset.is_empty() => return None,
                    Some(_) => self.signed_offset()?,
                    None => 0,
                };
                Some((self.signed_scalar()?, b))
            }
            Some("odd") if bare && self.offset_sign.is_none() => Some((2, 1)),
            Some("even") if bare && self.offset_sign.is_none() => Some((2, 0)),
            Some(_) => None,
        }
    }
}

/// Repeat multiplier carried by a token, if it is a supported equation
pub fn interpret(token: &Token) -> Option<i64> {
    match &token.kind {
        TokenKind::PseudoFunctionEquation(eq) => eq.repeat_multiplier(),
        _ => None,
    }
}
