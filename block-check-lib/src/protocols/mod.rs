//! Wire-protocol implementations for driving browsers.

/// W3C WebDriver client used to drive a real browser session
pub mod webdriver;

pub use webdriver::{WebDriverConfig, WebDriverSession};
