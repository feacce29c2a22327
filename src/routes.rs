use crate::{
    api::{approvals, attendance, leave_balance, leave_request, overtime_request, year_init},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

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

    let login_limiter = build_limiter(config.rate_login_per_min);
    let refresh_limiter = build_limiter(config.rate_refresh_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::refresh_token)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out").route(web::post().to(attendance::clock_out)),
                    )
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::manual_entry))
                            .route(web::get().to(attendance::attendance_list)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(attendance::correct_attendance)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave/balances
                    .service(
                        web::resource("/balances")
                            .route(web::get().to(leave_balance::balance_list)),
                    )
                    .service(
                        web::resource("/balances/initialize")
                            .route(web::post().to(year_init::initialize_year)),
                    )
                    .service(
                        web::resource("/balances/{id}/transactions")
                            .route(web::get().to(leave_balance::balance_transactions)),
                    )
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    )
                    .service(
                        web::resource("/{id}/supervisor/approve")
                            .route(web::put().to(leave_request::supervisor_approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/supervisor/reject")
                            .route(web::put().to(leave_request::supervisor_reject_leave)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    .service(
                        web::resource("/{id}/override")
                            .route(web::put().to(leave_request::override_leave)),
                    ),
            )
            .service(
                web::scope("/overtime")
                    // /overtime
                    .service(
                        web::resource("")
                            .route(web::get().to(overtime_request::overtime_list))
                            .route(web::post().to(overtime_request::create_overtime)),
                    )
                    // /overtime/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(overtime_request::get_overtime)),
                    )
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(overtime_request::cancel_overtime)),
                    )
                    .service(
                        web::resource("/{id}/supervisor/approve")
                            .route(web::put().to(overtime_request::supervisor_approve_overtime)),
                    )
                    .service(
                        web::resource("/{id}/supervisor/reject")
                            .route(web::put().to(overtime_request::supervisor_reject_overtime)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(overtime_request::approve_overtime)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(overtime_request::reject_overtime)),
                    )
                    .service(
                        web::resource("/{id}/override")
                            .route(web::put().to(overtime_request::override_overtime)),
                    ),
            )
            .service(
                web::scope("/approvals")
                    // /approvals
                    .service(web::resource("").route(web::get().to(approvals::approval_queue))),
            ),
    );
}
