pub mod booking;
pub mod ledger;
pub mod memory;
pub mod supabase;

pub use booking::BookingService;
pub use ledger::AppointmentLedger;
pub use memory::InMemoryLedger;
pub use supabase::SupabaseLedger;
