//! Invoice data model and its line-item operations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{InvgenError, Result};
use crate::invoice::input::{parse_non_negative, sanitize_non_negative};
use crate::invoice::totals::Totals;
use crate::models::config::DefaultsConfig;

/// Identifier of a line item, unique within its invoice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(String);

impl LineItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single billable row.
///
/// `amount` is always `quantity * rate`; it is recomputed on every change
/// and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineItemId,
    description: String,
    quantity: f64,
    rate: f64,
    amount: f64,
}

impl LineItem {
    /// A blank item: empty description, quantity 1, rate 0.
    pub fn blank(id: LineItemId) -> Self {
        Self {
            id,
            description: String::new(),
            quantity: 1.0,
            rate: 0.0,
            amount: 0.0,
        }
    }

    pub fn id(&self) -> &LineItemId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    fn apply(&mut self, update: LineUpdate) {
        match update {
            LineUpdate::Description(text) => self.description = text,
            LineUpdate::Quantity(quantity) => {
                self.quantity = sanitize_non_negative(quantity);
                self.recompute();
            }
            LineUpdate::Rate(rate) => {
                self.rate = sanitize_non_negative(rate);
                self.recompute();
            }
        }
    }

    fn recompute(&mut self) {
        self.amount = self.quantity * self.rate;
    }
}

/// Editable line-item fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Description,
    Quantity,
    Rate,
}

impl LineField {
    /// Build an update for this field from raw user input.
    ///
    /// Numeric fields coerce empty, non-numeric and negative input to 0.
    pub fn update_from(self, input: &str) -> LineUpdate {
        match self {
            LineField::Description => LineUpdate::Description(input.to_string()),
            LineField::Quantity => LineUpdate::Quantity(parse_non_negative(input)),
            LineField::Rate => LineUpdate::Rate(parse_non_negative(input)),
        }
    }
}

impl FromStr for LineField {
    type Err = InvgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "description" => Ok(LineField::Description),
            "quantity" | "qty" => Ok(LineField::Quantity),
            "rate" => Ok(LineField::Rate),
            other => Err(InvgenError::InvalidField {
                field: other.to_string(),
                reason: "expected one of: description, quantity, rate".to_string(),
            }),
        }
    }
}

/// A change to one line-item field.
#[derive(Debug, Clone, PartialEq)]
pub enum LineUpdate {
    Description(String),
    Quantity(f64),
    Rate(f64),
}

/// Contact details of the company or the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

/// Invoice-level attributes settable from text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceField {
    InvoiceNumber,
    Date,
    DueDate,
    CompanyName,
    CompanyAddress,
    CompanyEmail,
    CompanyPhone,
    ClientName,
    ClientAddress,
    ClientEmail,
    ClientPhone,
    Notes,
    TaxRate,
}

impl FromStr for InvoiceField {
    type Err = InvgenError;

    fn from_str(s: &str) -> Result<Self> {
        let field = match s.trim().to_lowercase().replace('_', "-").as_str() {
            "number" | "invoice-number" => InvoiceField::InvoiceNumber,
            "date" => InvoiceField::Date,
            "due-date" | "due" => InvoiceField::DueDate,
            "company.name" => InvoiceField::CompanyName,
            "company.address" => InvoiceField::CompanyAddress,
            "company.email" => InvoiceField::CompanyEmail,
            "company.phone" => InvoiceField::CompanyPhone,
            "client.name" => InvoiceField::ClientName,
            "client.address" => InvoiceField::ClientAddress,
            "client.email" => InvoiceField::ClientEmail,
            "client.phone" => InvoiceField::ClientPhone,
            "notes" => InvoiceField::Notes,
            "tax-rate" | "tax" => InvoiceField::TaxRate,
            other => {
                return Err(InvgenError::InvalidField {
                    field: other.to_string(),
                    reason: "unknown invoice field".to_string(),
                });
            }
        };
        Ok(field)
    }
}

/// An invoice being composed.
///
/// The line-item list is never empty: removing the last item is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Free-text invoice identifier.
    pub invoice_number: String,

    /// Issue date.
    pub date: NaiveDate,

    /// Payment due date. May precede the issue date.
    pub due_date: NaiveDate,

    /// Issuer details.
    pub company: Party,

    /// Company logo as a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,

    /// Receiver details.
    pub client: Party,

    line_items: Vec<LineItem>,

    /// Free-text notes shown below the totals.
    #[serde(default)]
    pub notes: String,

    tax_rate: f64,

    /// Last identifier handed out to a line item.
    #[serde(default)]
    last_item_id: u64,
}

impl Invoice {
    /// Create an invoice with default settings, stamped with the current time.
    pub fn new() -> Self {
        Self::from_defaults(&DefaultsConfig::default())
    }

    /// Create an invoice from configured defaults, stamped with the current time.
    pub fn from_defaults(defaults: &DefaultsConfig) -> Self {
        Self::with_defaults(defaults, Utc::now())
    }

    /// Create an invoice from configured defaults at the given creation time.
    pub fn with_defaults(defaults: &DefaultsConfig, now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self {
            invoice_number: generate_invoice_number(
                &defaults.invoice_prefix,
                defaults.number_digits,
                now,
            ),
            date: today,
            due_date: due_date_after(today, defaults.due_in_days),
            company: Party::default(),
            company_logo: None,
            client: Party::default(),
            line_items: vec![LineItem::blank(LineItemId::new("1"))],
            notes: String::new(),
            tax_rate: sanitize_non_negative(defaults.tax_rate),
            last_item_id: 1,
        }
    }

    /// Parse an invoice from JSON, restoring derived amounts.
    pub fn from_json(content: &str) -> Result<Self> {
        let mut invoice: Invoice = serde_json::from_str(content)?;
        if invoice.line_items.is_empty() {
            return Err(InvgenError::InvalidInvoice(
                "an invoice needs at least one line item".to_string(),
            ));
        }
        for item in &mut invoice.line_items {
            item.quantity = sanitize_non_negative(item.quantity);
            item.rate = sanitize_non_negative(item.rate);
            item.recompute();
        }
        invoice.tax_rate = sanitize_non_negative(invoice.tax_rate);
        let highest = invoice
            .line_items
            .iter()
            .filter_map(|item| item.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        invoice.last_item_id = invoice.last_item_id.max(highest);
        Ok(invoice)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Line items in display order.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Find a line item by identifier.
    pub fn line_item(&self, id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.id.as_str() == id)
    }

    /// Append a blank line item and return its identifier.
    pub fn add_line_item(&mut self) -> LineItemId {
        loop {
            self.last_item_id += 1;
            let id = LineItemId::new(self.last_item_id.to_string());
            if self.line_item(id.as_str()).is_none() {
                debug!("Adding line item {}", id);
                self.line_items.push(LineItem::blank(id.clone()));
                return id;
            }
        }
    }

    /// Remove a line item, unless it is the only one left.
    ///
    /// Returns whether an item was removed. Unknown identifiers are ignored.
    pub fn remove_line_item(&mut self, id: &str) -> bool {
        if self.line_items.len() <= 1 {
            debug!("Refusing to remove the last line item");
            return false;
        }
        let before = self.line_items.len();
        self.line_items.retain(|item| item.id.as_str() != id);
        before != self.line_items.len()
    }

    /// Apply an update to a line item. Returns whether the item exists.
    pub fn update_line_item(&mut self, id: &str, update: LineUpdate) -> bool {
        match self.line_items.iter_mut().find(|item| item.id.as_str() == id) {
            Some(item) => {
                item.apply(update);
                true
            }
            None => false,
        }
    }

    /// Tax rate in percent.
    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    /// Set the tax rate; negative or non-finite values become 0.
    pub fn set_tax_rate(&mut self, rate: f64) {
        self.tax_rate = sanitize_non_negative(rate);
    }

    /// Store an encoded logo.
    pub fn set_logo(&mut self, data_uri: String) {
        self.company_logo = Some(data_uri);
    }

    /// Clear the logo.
    pub fn remove_logo(&mut self) {
        self.company_logo = None;
    }

    /// Derived totals for the current state.
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.line_items, self.tax_rate)
    }

    /// Set an invoice-level attribute from raw text input.
    pub fn set_field(&mut self, field: InvoiceField, value: &str) -> Result<()> {
        match field {
            InvoiceField::InvoiceNumber => self.invoice_number = value.to_string(),
            InvoiceField::Date => self.date = parse_date("date", value)?,
            InvoiceField::DueDate => self.due_date = parse_date("due-date", value)?,
            InvoiceField::CompanyName => self.company.name = value.to_string(),
            InvoiceField::CompanyAddress => self.company.address = value.to_string(),
            InvoiceField::CompanyEmail => self.company.email = value.to_string(),
            InvoiceField::CompanyPhone => self.company.phone = value.to_string(),
            InvoiceField::ClientName => self.client.name = value.to_string(),
            InvoiceField::ClientAddress => self.client.address = value.to_string(),
            InvoiceField::ClientEmail => self.client.email = value.to_string(),
            InvoiceField::ClientPhone => self.client.phone = value.to_string(),
            InvoiceField::Notes => self.notes = value.to_string(),
            InvoiceField::TaxRate => self.tax_rate = parse_non_negative(value),
        }
        Ok(())
    }
}

impl Default for Invoice {
    fn default() -> Self {
        Self::new()
    }
}

/// Payment term used when the configured one does not fit the calendar.
const FALLBACK_DUE_IN_DAYS: i64 = 30;

fn due_date_after(today: NaiveDate, days: i64) -> NaiveDate {
    let shift = |days| {
        TimeDelta::try_days(days).and_then(|delta| today.checked_add_signed(delta))
    };
    shift(days).unwrap_or_else(|| {
        warn!("due_in_days {} is out of range, using {}", days, FALLBACK_DUE_IN_DAYS);
        shift(FALLBACK_DUE_IN_DAYS).unwrap_or(today)
    })
}

/// `prefix` followed by the last `digits` digits of the millisecond timestamp.
fn generate_invoice_number(prefix: &str, digits: usize, now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().to_string();
    let start = millis.len().saturating_sub(digits);
    format!("{}{}", prefix, &millis[start..])
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| InvgenError::InvalidField {
        field: field.to_string(),
        reason: format!("expected YYYY-MM-DD ({})", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn invoice() -> Invoice {
        Invoice::with_defaults(&DefaultsConfig::default(), fixed_now())
    }

    #[test]
    fn test_defaults() {
        let invoice = invoice();
        let millis = fixed_now().timestamp_millis().to_string();

        assert_eq!(invoice.invoice_number, format!("INV-{}", &millis[millis.len() - 6..]));
        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 4, 14).unwrap());
        assert_eq!(invoice.tax_rate(), 10.0);
        assert_eq!(invoice.line_items().len(), 1);

        let item = &invoice.line_items()[0];
        assert_eq!(item.id().as_str(), "1");
        assert_eq!(item.description(), "");
        assert_eq!(item.quantity(), 1.0);
        assert_eq!(item.rate(), 0.0);
        assert_eq!(item.amount(), 0.0);
    }

    #[test]
    fn test_out_of_range_due_in_days_falls_back() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 4, 14).unwrap();

        for due_in_days in [1_000_000_000, i64::MAX, i64::MIN] {
            let defaults = DefaultsConfig {
                due_in_days,
                ..DefaultsConfig::default()
            };
            let invoice = Invoice::with_defaults(&defaults, fixed_now());
            assert_eq!(invoice.date, today);
            assert_eq!(invoice.due_date, expected);
        }

        let defaults = DefaultsConfig {
            due_in_days: -1,
            ..DefaultsConfig::default()
        };
        let invoice = Invoice::with_defaults(&defaults, fixed_now());
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }

    #[test]
    fn test_add_line_item_is_blank_and_unique() {
        let mut invoice = invoice();
        let a = invoice.add_line_item();
        let b = invoice.add_line_item();

        assert_ne!(a, b);
        assert_eq!(invoice.line_items().len(), 3);
        assert_eq!(invoice.line_items()[2], LineItem::blank(b));
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut invoice = invoice();
        let a = invoice.add_line_item();
        assert!(invoice.remove_line_item(a.as_str()));
        let b = invoice.add_line_item();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_never_empties() {
        let mut invoice = invoice();
        let added = invoice.add_line_item();
        assert_eq!(invoice.line_items().len(), 2);

        assert!(invoice.remove_line_item("1"));
        assert_eq!(invoice.line_items().len(), 1);
        assert_eq!(invoice.line_items()[0].id(), &added);

        assert!(!invoice.remove_line_item(added.as_str()));
        assert!(!invoice.remove_line_item(added.as_str()));
        assert_eq!(invoice.line_items().len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut invoice = invoice();
        invoice.add_line_item();
        assert!(!invoice.remove_line_item("missing"));
        assert_eq!(invoice.line_items().len(), 2);
    }

    #[test]
    fn test_update_recomputes_amount() {
        let mut invoice = invoice();
        assert!(invoice.update_line_item("1", LineUpdate::Quantity(3.0)));
        assert!(invoice.update_line_item("1", LineUpdate::Rate(12.5)));
        assert_eq!(invoice.line_items()[0].amount(), 37.5);

        assert!(invoice.update_line_item("1", LineUpdate::Quantity(4.0)));
        assert_eq!(invoice.line_items()[0].amount(), 50.0);
    }

    #[test]
    fn test_update_sequence_tracks_product() {
        let mut invoice = invoice();
        let steps = [
            LineField::Quantity.update_from("2"),
            LineField::Rate.update_from("7.25"),
            LineField::Quantity.update_from("abc"),
            LineField::Quantity.update_from("0.5"),
            LineField::Rate.update_from("-3"),
            LineField::Rate.update_from("10"),
        ];
        for step in steps {
            invoice.update_line_item("1", step);
            let item = &invoice.line_items()[0];
            assert_eq!(item.amount(), item.quantity() * item.rate());
        }
        assert_eq!(invoice.line_items()[0].amount(), 5.0);
    }

    #[test]
    fn test_description_does_not_touch_amount() {
        let mut invoice = invoice();
        invoice.update_line_item("1", LineUpdate::Rate(20.0));
        invoice.update_line_item("1", LineField::Description.update_from("Consulting"));
        let item = &invoice.line_items()[0];
        assert_eq!(item.description(), "Consulting");
        assert_eq!(item.amount(), 20.0);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut invoice = invoice();
        let before = invoice.clone();
        assert!(!invoice.update_line_item("42", LineUpdate::Rate(9.0)));
        assert_eq!(invoice, before);
    }

    #[test]
    fn test_set_field() {
        let mut invoice = invoice();
        invoice.set_field(InvoiceField::CompanyName, "Acme").unwrap();
        invoice.set_field(InvoiceField::ClientEmail, "bob@example.com").unwrap();
        invoice.set_field(InvoiceField::DueDate, "2024-01-01").unwrap();
        invoice.set_field(InvoiceField::TaxRate, "not a number").unwrap();

        assert_eq!(invoice.company.name, "Acme");
        assert_eq!(invoice.client.email, "bob@example.com");
        // Due before issue date is allowed.
        assert!(invoice.due_date < invoice.date);
        assert_eq!(invoice.tax_rate(), 0.0);

        invoice.set_field(InvoiceField::TaxRate, "-5").unwrap();
        assert_eq!(invoice.tax_rate(), 0.0);
        invoice.set_field(InvoiceField::TaxRate, "7.5").unwrap();
        assert_eq!(invoice.tax_rate(), 7.5);
    }

    #[test]
    fn test_set_field_rejects_bad_date() {
        let mut invoice = invoice();
        let err = invoice.set_field(InvoiceField::Date, "15/03/2024").unwrap_err();
        assert!(matches!(err, InvgenError::InvalidField { .. }));
        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_field_names() {
        assert_eq!("company.name".parse::<InvoiceField>().unwrap(), InvoiceField::CompanyName);
        assert_eq!("tax_rate".parse::<InvoiceField>().unwrap(), InvoiceField::TaxRate);
        assert_eq!("Quantity".parse::<LineField>().unwrap(), LineField::Quantity);
        assert!("amount".parse::<LineField>().is_err());
    }

    #[test]
    fn test_logo() {
        let mut invoice = invoice();
        invoice.set_logo("data:image/png;base64,AAAA".to_string());
        assert!(invoice.company_logo.is_some());
        invoice.remove_logo();
        assert!(invoice.company_logo.is_none());
        invoice.remove_logo();
        assert!(invoice.company_logo.is_none());
    }

    #[test]
    fn test_json_restores_amounts_and_counter() {
        let mut invoice = invoice();
        let id = invoice.add_line_item();
        invoice.update_line_item(id.as_str(), LineUpdate::Quantity(2.0));
        invoice.update_line_item(id.as_str(), LineUpdate::Rate(50.0));

        let json = invoice.to_json().unwrap().replace("100.0", "999.0");
        let mut restored = Invoice::from_json(&json).unwrap();
        assert_eq!(restored.line_item(id.as_str()).unwrap().amount(), 100.0);

        let next = restored.add_line_item();
        assert_eq!(next.as_str(), "3");
    }

    #[test]
    fn test_json_rejects_empty_items() {
        let mut value = serde_json::to_value(invoice()).unwrap();
        value["line_items"] = serde_json::json!([]);
        let err = Invoice::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, InvgenError::InvalidInvoice(_)));
    }
}
