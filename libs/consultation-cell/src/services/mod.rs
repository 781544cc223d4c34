pub mod booking;
pub mod doctor;
pub mod slot;
pub mod specialty;

pub use booking::AppointmentService;
pub use doctor::DoctorService;
pub use slot::SlotService;
pub use specialty::SpecialtyService;
