//! Client-side validation gate for new expenses.
//!
//! An `ExpenseForm` holds the four fields exactly as the user typed them.
//! Nothing reaches the network until `validate` has turned it into a
//! [`NewExpense`].

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::types::NewExpense;

/// Raw, unvalidated input for a new expense.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: String,
    pub date: String,
    pub category: String,
}

impl ExpenseForm {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        date: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            date: date.into(),
            category: category.into(),
        }
    }

    /// Every field must be non-blank, `amount` a finite number and `date` a
    /// `YYYY-MM-DD` calendar date. Text fields are trimmed.
    pub fn validate(&self) -> Result<NewExpense, ApiError> {
        let description = required("description", &self.description)?;
        let amount = required("amount", &self.amount)?;
        let date = required("date", &self.date)?;
        let category = required("category", &self.category)?;

        let amount = amount
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
            .ok_or_else(|| ApiError::Validation(format!("amount {amount:?} is not a number")))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ApiError::Validation(format!("date {date:?} is not YYYY-MM-DD")))?;

        Ok(NewExpense {
            description: description.to_string(),
            amount,
            date,
            category: category.to_string(),
        })
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ExpenseForm {
        ExpenseForm::new("Bus", "2", "2024-01-03", "Transport")
    }

    #[test]
    fn valid_form_produces_draft() {
        let draft = valid().validate().unwrap();
        assert_eq!(draft.description, "Bus");
        assert_eq!(draft.amount, 2.0);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(draft.category, "Transport");
    }

    #[test]
    fn fields_are_trimmed() {
        let form = ExpenseForm::new("  Bus ", " 2.50 ", "2024-01-03", " Transport");
        let draft = form.validate().unwrap();
        assert_eq!(draft.description, "Bus");
        assert_eq!(draft.amount, 2.5);
        assert_eq!(draft.category, "Transport");
    }

    #[test]
    fn each_blank_field_is_rejected() {
        let blanks = [
            ("description", ExpenseForm { description: " ".into(), ..valid() }),
            ("amount", ExpenseForm { amount: String::new(), ..valid() }),
            ("date", ExpenseForm { date: String::new(), ..valid() }),
            ("category", ExpenseForm { category: "\t".into(), ..valid() }),
        ];
        for (field, form) in blanks {
            let err = form.validate().unwrap_err();
            assert_eq!(err, ApiError::Validation(format!("{field} is required")), "{field}");
        }
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        for amount in ["abc", "1,50", "inf", "NaN"] {
            let form = ExpenseForm { amount: amount.into(), ..valid() };
            assert!(matches!(form.validate(), Err(ApiError::Validation(_))), "{amount}");
        }
    }

    #[test]
    fn malformed_date_is_rejected() {
        let form = ExpenseForm { date: "03/01/2024".into(), ..valid() };
        assert!(matches!(form.validate(), Err(ApiError::Validation(_))));
    }
}
