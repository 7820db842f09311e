use crate::api::attendance::{CreateAttendance, UpdateAttendance};
use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::api::payment::{CreatePayment, UpdatePayment};
use crate::api::payroll::{CreatePayroll, UpdatePayroll};
use crate::cascade::CascadeSummary;
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::model::payment::{PaymentMethod, PaymentRecord};
use crate::model::payroll::PayrollEntry;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll System API",
        version = "1.0.0",
        description = r#"
## Employee Payroll Management System

This API powers an employee payroll back office: master data, daily
attendance, computed payroll entries, and the payments that settle them.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles
- **Attendance Management**
  - Daily presence records per employee, with period queries
- **Payroll Management**
  - Payroll entries linking attendance to payments, with monthly views
- **Payment Management**
  - Payment records with soft deletion and printable text receipts

### 🔐 Security
Endpoints are protected using **JWT Bearer authentication** issued by the
company identity provider.

### 📦 Response Format
- JSON responses wrapped in a `{status, message, data}` envelope
- Validation failures add an `errors` map with per-field messages

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::create_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,
        crate::api::attendance::attendance_by_employee,
        crate::api::attendance::attendance_by_period,

        crate::api::payroll::create_payroll,
        crate::api::payroll::list_payrolls,
        crate::api::payroll::get_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::delete_payroll,
        crate::api::payroll::payroll_by_employee,
        crate::api::payroll::payroll_by_attendance,
        crate::api::payroll::payroll_by_payment,
        crate::api::payroll::payroll_by_period,

        crate::api::payment::create_payment,
        crate::api::payment::list_payments,
        crate::api::payment::get_payment,
        crate::api::payment::update_payment,
        crate::api::payment::delete_payment,
        crate::api::payment::payments_by_employee,
        crate::api::payment::payment_receipt
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            UpdateEmployee,
            Attendance,
            CreateAttendance,
            UpdateAttendance,
            PayrollEntry,
            CreatePayroll,
            UpdatePayroll,
            PaymentMethod,
            PaymentRecord,
            CreatePayment,
            UpdatePayment,
            CascadeSummary
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Payment", description = "Payment and receipt APIs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
