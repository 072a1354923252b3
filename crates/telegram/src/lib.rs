pub mod chart;
pub mod message;
pub mod notifier;

pub use chart::ChartLinks;
pub use message::format_alert;
pub use notifier::TelegramNotifier;
