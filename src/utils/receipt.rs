//! Plain-text salary receipt rendering.
//!
//! The document embeds the employee and payment data an external PDF
//! renderer would otherwise consume. Layout is fixed-width so the output
//! prints cleanly on 42-column receipt paper.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::employee::Employee;
use crate::model::payment::PaymentRecord;

const WIDTH: usize = 42;
const COMPANY_NAME: &str = "PT. Sejahtera Indonesia";
const COMPANY_ADDRESS: &str = "Jl. Merdeka No. 1, Jakarta";

/// Render the receipt text for a payment and its owning employee.
pub fn render_receipt(payment: &PaymentRecord, employee: &Employee) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(WIDTH));
    lines.push(center(COMPANY_NAME));
    lines.push(center(COMPANY_ADDRESS));
    lines.push("=".repeat(WIDTH));
    lines.push(row("Receipt No.", &payment.id));
    lines.push(row("Payment Date", &payment.paid_at.format("%Y-%m-%d").to_string()));
    lines.push(row("Method", payment.method.label()));
    lines.push("-".repeat(WIDTH));
    lines.push(row("Employee", &employee.name));
    lines.push(row("Job Title", &employee.job_title));
    lines.push("-".repeat(WIDTH));
    lines.push(amount_row("Base Salary", employee.base_salary));
    lines.push("-".repeat(WIDTH));
    lines.push(amount_row("Total", employee.base_salary));
    lines.push("=".repeat(WIDTH));
    lines.push(center("Thank you for your service"));
    lines.push("=".repeat(WIDTH));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Write the rendered receipt to `<dir>/<payment_id>.txt`, creating the
/// directory if needed. Returns the path of the written file.
pub fn write_receipt(
    dir: &Path,
    payment: &PaymentRecord,
    employee: &Employee,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.txt", payment.id));
    fs::write(&path, render_receipt(payment, employee))?;
    Ok(path)
}

/// Indonesian-style rupiah formatting: `5000000` becomes `Rp 5.000.000`.
pub fn format_idr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let sign = if amount < 0 { "-" } else { "" };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("Rp {sign}{grouped}")
}

fn center(text: &str) -> String {
    if text.len() >= WIDTH {
        return text.to_string();
    }
    let pad = (WIDTH - text.len()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

fn row(label: &str, value: &str) -> String {
    format!("{label:<14}: {value}")
}

fn amount_row(label: &str, amount: i64) -> String {
    format!("{:<14}: {:>26}", label, format_idr(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payment::PaymentMethod;
    use chrono::{NaiveDate, Utc};

    fn sample() -> (PaymentRecord, Employee) {
        let payment = PaymentRecord {
            id: "PMB-001".to_string(),
            employee_id: "KRY-001".to_string(),
            paid_at: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            method: PaymentMethod::BankTransfer,
            receipt_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        let employee = Employee {
            id: "KRY-001".to_string(),
            name: "John".to_string(),
            job_title: "Staff".to_string(),
            base_salary: 5_000_000,
        };
        (payment, employee)
    }

    #[test]
    fn rupiah_amounts_group_in_threes() {
        assert_eq!(format_idr(0), "Rp 0");
        assert_eq!(format_idr(100), "Rp 100");
        assert_eq!(format_idr(1_000), "Rp 1.000");
        assert_eq!(format_idr(5_000_000), "Rp 5.000.000");
        assert_eq!(format_idr(1_234_567_890), "Rp 1.234.567.890");
    }

    #[test]
    fn receipt_embeds_payment_and_employee_details() {
        let (payment, employee) = sample();
        let text = render_receipt(&payment, &employee);

        assert!(text.contains(COMPANY_NAME));
        assert!(text.contains("PMB-001"));
        assert!(text.contains("2026-01-31"));
        assert!(text.contains("Bank Transfer"));
        assert!(text.contains("John"));
        assert!(text.contains("Staff"));
        assert!(text.contains("Rp 5.000.000"));
    }

    #[test]
    fn receipt_file_lands_under_payment_id() {
        let (payment, employee) = sample();
        let dir = tempfile::tempdir().unwrap();

        let path = write_receipt(dir.path(), &payment, &employee).unwrap();

        assert_eq!(path, dir.path().join("PMB-001.txt"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("Thank you for your service"));
    }
}
