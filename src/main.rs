use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use std::io;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use detailing::api::{
    add_ons, agents, auth, bookings, coupons, customers, employees,
    helpers::{json_error_handler, path_error_handler, query_error_handler},
    middleware::RequestId,
    packages, realtime, services, sms, status, timeslots, vehicles,
};
use detailing::app_state::AppState;
use detailing::config::Config;
use detailing::database::{self, models, schema};
use detailing::repositories::{conversations, customer_services};
use detailing::services::sms_gateway;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| io::Error::other(format!("Bad configuration: {}", e)))?;
    let db_url = config
        .database_url
        .clone()
        .ok_or_else(|| io::Error::other("DATABASE_URL must be set"))?;
    let db = database::connect_from_url(&db_url).await?;

    if config.sync_db {
        schema::sync(&db)
            .await
            .map_err(|e| io::Error::other(format!("Schema sync failed: {}", e)))?;
        log::info!("Database schema synchronised");
    }

    #[derive(OpenApi)]
    #[openapi(
        paths(
            // Auth
            auth::login_customer,
            auth::login_admin,
            auth::login_employee,
            auth::signup,
            auth::signup_admin,
            auth::forgot_password,
            auth::reset_password_handler,
            auth::me,
            // Customers
            customers::create_customer,
            customers::create_intent,
            customers::get_customer,
            customers::list_customers,
            customers::update_customer,
            customers::delete_customer,
            // Employees
            employees::create_employee,
            employees::get_employee,
            employees::list_employees,
            employees::update_employee,
            employees::delete_employee,
            // Vehicles
            vehicles::save_vehicle,
            vehicles::list_vehicles,
            // Booking
            bookings::create_booking,
            bookings::create_customer_service,
            bookings::list_bookings,
            bookings::get_booking,
            bookings::update_booking_status,
            bookings::update_booking_employee,
            bookings::delete_booking,
            // Catalog
            add_ons::create_category,
            add_ons::update_category,
            add_ons::list_categories,
            add_ons::get_category,
            add_ons::delete_category,
            add_ons::create_add_on,
            add_ons::update_add_on,
            add_ons::list_add_ons,
            add_ons::get_add_on,
            add_ons::delete_add_on,
            packages::create_package,
            packages::update_package,
            packages::list_packages,
            packages::get_package,
            packages::delete_package,
            services::create_service,
            services::update_service,
            services::set_popular,
            services::list_services,
            services::get_service,
            services::delete_service,
            timeslots::create_timeslot,
            timeslots::update_timeslot,
            timeslots::list_timeslots,
            timeslots::list_for_date,
            timeslots::get_timeslot,
            timeslots::delete_timeslot,
            // Promotions
            coupons::create_coupon,
            coupons::update_coupon,
            coupons::list_coupons,
            coupons::get_coupon,
            coupons::get_coupon_by_code,
            coupons::delete_coupon,
            agents::create_agent,
            agents::update_agent,
            agents::duplicate_agent,
            agents::get_agent_by_type_and_name,
            agents::list_agents,
            agents::delete_agent,
            // SMS
            sms::sms_callback,
            sms::send_sms,
            sms::generate_sms,
            sms::unseen_count,
            sms::mark_seen,
            sms::find_conversation,
            sms::create_conversation,
            sms::create_test_conversation,
            sms::update_conversation,
            sms::list_conversations,
            sms::update_agent_activation,
            sms::conversation_messages,
            realtime::stream,
            status::status,
        ),
        components(
            schemas(
                // --- Models ---
                models::customer::Model,
                models::employee::Model,
                models::vehicle::Model,
                models::customer_service::Model,
                models::add_on_category::Model,
                models::add_on::Model,
                models::package::Model,
                models::service::Model,
                models::timeslot::Model,
                models::coupon::Model,
                models::agent::Model,
                models::sms_conversation::Model,
                models::sms_message::Model,

                // --- DTOs ---
                auth::LoginRequest,
                auth::LoginResponse,
                auth::SignupRequest,
                auth::AdminSignupRequest,
                auth::ForgotPasswordRequest,
                auth::ResetPasswordRequest,
                customers::CreateCustomerDto,
                customers::CustomerIntentDto,
                customers::UpdateCustomerDto,
                employees::CreateEmployeeDto,
                employees::UpdateEmployeeDto,
                vehicles::VehicleDto,
                vehicles::SaveVehicleDto,
                bookings::TimeslotChoice,
                bookings::CreateBookingDto,
                bookings::VehicleRef,
                bookings::CreateCustomerServiceDto,
                bookings::UpdateBookingStatusDto,
                bookings::AssignEmployeeDto,
                customer_services::BookingDetails,
                customer_services::BookingSchedule,
                customer_services::BookedAddOn,
                add_ons::AddOnCategoryDto,
                add_ons::AddOnDto,
                packages::PackageDto,
                packages::PackageView,
                services::ServiceDto,
                services::PopularDto,
                services::ServiceView,
                timeslots::TimeslotDto,
                coupons::CouponDto,
                agents::AgentDto,
                sms::SmsCallbackEcho,
                sms::SendSmsDto,
                sms::SentSms,
                sms::GenerateSmsDto,
                sms::ConversationView,
                sms::CreateConversationDto,
                sms::UpdateConversationDto,
                sms::CreateTestConversationDto,
                sms::AgentActivationDto,
                sms::MarkSeenDto,
                sms::UnseenCount,
                conversations::ConversationSummary,
                sms_gateway::GatewayMessage,
                status::StatusResponse
            )
        ),
        tags(
            (name = "Auth", description = "Login, signup and password reset for every role"),
            (name = "Customers", description = "Customer accounts and leads"),
            (name = "Employees", description = "Employee management"),
            (name = "Vehicles", description = "Customer vehicles"),
            (name = "Booking", description = "Booking creation and administration"),
            (name = "AddOns", description = "Add-on categories and add-ons"),
            (name = "Packages", description = "Service packages"),
            (name = "Services", description = "Detailing services"),
            (name = "Timeslots", description = "Bookable time slots"),
            (name = "Coupons", description = "Discount coupons"),
            (name = "Agents", description = "SMS and email auto-responder personas"),
            (name = "SMS", description = "Gateway callback and outbound SMS"),
            (name = "SMSConversation", description = "Admin inbox conversations"),
            (name = "Realtime", description = "Server-sent inbox events"),
            (name = "Status", description = "Build information")
        )
    )]
    struct ApiDoc;

    let host = config.host.clone();
    let port = config.port;
    let body_limit = config.effective_max_body_bytes();
    let state = AppState::from_config(db, config);

    log::info!("Starting server at http://{}:{}", host, port);
    log::info!("Swagger UI available at http://{}:{}/swagger-ui/", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::Logger::default())
            .wrap(RequestId)
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .app_data(
                web::JsonConfig::default()
                    .limit(body_limit)
                    .error_handler(json_error_handler),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(
                web::scope("/api")
                    .configure(auth::init_routes)
                    .configure(customers::init_routes)
                    .configure(employees::init_routes)
                    .configure(vehicles::init_routes)
                    .configure(bookings::init_routes)
                    .configure(add_ons::init_routes)
                    .configure(packages::init_routes)
                    .configure(services::init_routes)
                    .configure(timeslots::init_routes)
                    .configure(coupons::init_routes)
                    .configure(agents::init_routes)
                    .configure(sms::init_routes)
                    .configure(realtime::init_routes)
                    .configure(status::init_routes),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .workers(num_cpus::get())
    .bind((host, port))?
    .run()
    .await
}
