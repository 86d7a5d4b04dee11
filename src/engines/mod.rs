pub mod reminder_scheduler;
pub mod session_engine;
pub mod ticket_engine;
pub mod wallet_engine;

pub use reminder_scheduler::ReminderScheduler;
pub use session_engine::SessionEngine;
pub use ticket_engine::TicketEngine;
pub use wallet_engine::WalletEngine;
