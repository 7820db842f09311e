use crate::{
    api::{attendance, employee, payment, payroll},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, error::InternalError, middleware::from_fn, web};
use serde_json::json;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    fn malformed(section: &str, message: &str, detail: String) -> HttpResponse {
        HttpResponse::BadRequest().json(json!({
            "status": "error",
            "message": message,
            "errors": { section: [detail] }
        }))
    }

    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Shape/type failures the deserializers reject themselves, wrapped in
    // the standard envelope. Field rules are the validators' job.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        InternalError::from_response(err, malformed("body", "Malformed request payload", detail))
            .into()
    }));
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        InternalError::from_response(err, malformed("path", "Malformed path parameter", detail))
            .into()
    }));

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::create_attendance))
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    // /attendance/employee/{id}
                    .service(
                        web::resource("/employee/{id}")
                            .route(web::get().to(attendance::attendance_by_employee)),
                    )
                    // /attendance/period/{from}/{to}
                    .service(
                        web::resource("/period/{from}/{to}")
                            .route(web::get().to(attendance::attendance_by_period)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(attendance::get_attendance))
                            .route(web::put().to(attendance::update_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(
                        web::resource("")
                            .route(web::post().to(payroll::create_payroll))
                            .route(web::get().to(payroll::list_payrolls)),
                    )
                    // /payroll/employee/{id}
                    .service(
                        web::resource("/employee/{id}")
                            .route(web::get().to(payroll::payroll_by_employee)),
                    )
                    // /payroll/attendance/{id}
                    .service(
                        web::resource("/attendance/{id}")
                            .route(web::get().to(payroll::payroll_by_attendance)),
                    )
                    // /payroll/payment/{id}
                    .service(
                        web::resource("/payment/{id}")
                            .route(web::get().to(payroll::payroll_by_payment)),
                    )
                    // /payroll/period/{year}/{month}
                    .service(
                        web::resource("/period/{year}/{month}")
                            .route(web::get().to(payroll::payroll_by_period)),
                    )
                    // /payroll/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::put().to(payroll::update_payroll))
                            .route(web::delete().to(payroll::delete_payroll)),
                    ),
            )
            .service(
                web::scope("/payments")
                    // /payments
                    .service(
                        web::resource("")
                            .route(web::post().to(payment::create_payment))
                            .route(web::get().to(payment::list_payments)),
                    )
                    // /payments/employee/{id}
                    .service(
                        web::resource("/employee/{id}")
                            .route(web::get().to(payment::payments_by_employee)),
                    )
                    // /payments/{id}/receipt
                    .service(
                        web::resource("/{id}/receipt")
                            .route(web::get().to(payment::payment_receipt)),
                    )
                    // /payments/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payment::get_payment))
                            .route(web::put().to(payment::update_payment))
                            .route(web::delete().to(payment::delete_payment)),
                    ),
            ),
    );
}
