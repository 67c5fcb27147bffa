pub mod functions;
pub mod handlers;
pub mod structures;

pub use handlers::{
    __path_create_booking, __path_create_customer_service, __path_delete_booking,
    __path_get_booking, __path_list_bookings, __path_update_booking_employee,
    __path_update_booking_status, create_booking, create_customer_service, delete_booking,
    get_booking, init_routes, list_bookings, update_booking_employee, update_booking_status,
};

pub use structures::{
    AssignEmployeeDto, BookingListQuery, CreateBookingDto, CreateCustomerServiceDto,
    TimeslotChoice, UpdateBookingStatusDto, VehicleRef,
};
