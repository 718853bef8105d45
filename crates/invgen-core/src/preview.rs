//! HTML rendering of the invoice preview.
//!
//! This is the document that gets printed or rasterized for export.

use askama::Template;
use chrono::NaiveDate;

use crate::error::Result;
use crate::invoice::input::{format_amount, format_money};
use crate::models::invoice::{Invoice, Party};

#[derive(Template)]
#[template(path = "preview.html")]
struct PreviewTemplate<'a> {
    invoice_number: &'a str,
    logo: Option<&'a str>,
    date: String,
    due_date: String,
    parties: [PartyView<'a>; 2],
    rows: Vec<RowView<'a>>,
    subtotal: String,
    tax_rate: f64,
    tax_amount: String,
    total: String,
    notes: &'a str,
}

struct PartyView<'a> {
    heading: &'static str,
    name: &'a str,
    address: &'a str,
    email: &'a str,
    phone: &'a str,
}

impl<'a> PartyView<'a> {
    fn new(heading: &'static str, party: &'a Party, placeholder: &'static str) -> Self {
        Self {
            heading,
            name: if party.name.is_empty() {
                placeholder
            } else {
                &party.name
            },
            address: &party.address,
            email: &party.email,
            phone: &party.phone,
        }
    }
}

struct RowView<'a> {
    description: &'a str,
    quantity: f64,
    rate: String,
    amount: String,
}

/// Render the invoice preview as a standalone HTML document.
///
/// All invoice text is HTML-escaped by the template.
pub fn render_preview_html(invoice: &Invoice) -> Result<String> {
    let totals = invoice.totals();
    let rows = invoice
        .line_items()
        .iter()
        .map(|item| RowView {
            description: if item.description().is_empty() {
                "Service description"
            } else {
                item.description()
            },
            quantity: item.quantity(),
            rate: format_money(item.rate()),
            amount: format_money(item.amount()),
        })
        .collect();

    let template = PreviewTemplate {
        invoice_number: &invoice.invoice_number,
        logo: invoice.company_logo.as_deref(),
        date: display_date(invoice.date),
        due_date: display_date(invoice.due_date),
        parties: [
            PartyView::new("From:", &invoice.company, "Your Company"),
            PartyView::new("To:", &invoice.client, "Client Name"),
        ],
        rows,
        subtotal: format_amount(totals.subtotal),
        tax_rate: invoice.tax_rate(),
        tax_amount: format_amount(totals.tax_amount),
        total: format_amount(totals.total),
        notes: &invoice.notes,
    };
    Ok(template.render()?)
}

fn display_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
