//! Domain types shared across engines: statuses, enums, and the constant
//! tables (reward catalog, SLA hours, category routing) that spec.md pins
//! down as fixed business rules rather than configuration.

pub mod charger;
pub mod session;
pub mod ticket;
pub mod wallet;

pub use charger::{ChargerAvailability, FaultType};
pub use session::SessionStatus;
pub use ticket::{Department, TicketCategory, TicketPriority, TicketStatus};
pub use wallet::{PaymentGatewayKind, RewardCode, RewardItem};
