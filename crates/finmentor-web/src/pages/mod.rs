//! Page Components

mod chat;
mod portfolio;

pub use chat::ChatPage;
pub use portfolio::PortfolioPage;
