pub mod attendance;

pub mod books;

pub mod notifications;

pub mod roster;

pub use attendance::configure_attendance_routes;
pub use books::configure_books_routes;
pub use notifications::configure_notification_routes;
pub use roster::configure_roster_routes;
