pub mod functions;
pub mod handlers;
pub mod structures;

pub use handlers::{
    __path_forgot_password, __path_login_admin, __path_login_customer, __path_login_employee,
    __path_me, __path_reset_password_handler, __path_signup, __path_signup_admin, forgot_password,
    init_routes, login_admin, login_customer, login_employee, me, reset_password_handler, signup,
    signup_admin,
};

pub use structures::{
    AdminSignupRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest,
    SignupRequest,
};
